table! {
    use diesel::sql_types::*;

    documents (collection, id) {
        collection -> Text,
        id -> Text,
        body -> Jsonb,
    }
}
