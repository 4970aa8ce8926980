extern crate coursework;

use actix_web::{
    middleware::Logger,
    web::{get, post},
    App, HttpServer,
};
use dotenv::dotenv;
use log::{info, warn};
use std::{
    io::{Error, ErrorKind},
    sync::Arc,
};
use structopt::StructOpt;

use coursework::{
    config::{ResubmissionPolicy, Settings},
    db::{DocumentStore, MemoryStore, PgStore},
    service::{
        endpoints::{graphiql, graphql},
        AppState,
    },
};

#[derive(Debug, StructOpt)]
#[structopt(name = "coursework")]
struct Opt {
    /// PostgreSQL url; content and progress stay in memory when absent
    #[structopt(short = "u", long = "db-url", env = "DATABASE_URL")]
    database_url: Option<String>,
    #[structopt(short = "s", long = "socket", default_value = "127.0.0.1:8000")]
    socket: String,
    /// Key used to verify the HS256 tokens in the Authorization header
    #[structopt(long = "jwt-secret", env = "JWT_SECRET", default_value = "secret")]
    jwt_secret: String,
    /// What to do with a second answer to the same step: reject, overwrite or append-history
    #[structopt(
        long = "resubmission",
        env = "RESUBMISSION_POLICY",
        default_value = "overwrite"
    )]
    resubmission: ResubmissionPolicy,
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();
    let opt = Opt::from_args();

    let store: Arc<dyn DocumentStore> = match opt.database_url {
        Some(ref url) => {
            let store =
                PgStore::connect(url).map_err(|e| Error::new(ErrorKind::Other, e.to_string()))?;
            Arc::new(store)
        }
        None => {
            warn!("No database url given, nothing will survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let settings = Settings {
        jwt_secret: opt.jwt_secret,
        resubmission: opt.resubmission,
    };
    let data = AppState::new(store, settings);

    let url = opt.socket;

    info!(
        "Coursework running at: http://{} (answer resubmission: {})",
        url, opt.resubmission
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .data(data.clone())
            .route("/graphql", post().to(graphql))
            .route("/graphiql", get().to(graphiql))
    })
    .bind(&url)?
    .run()
    .await
}
