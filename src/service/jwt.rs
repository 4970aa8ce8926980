extern crate jsonwebtoken as jwt;

use chrono::Utc;
use jwt::{decode, encode, Header, Validation};

use crate::graphql::guard::{Principal, User};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    #[serde(default)]
    pub admin: bool,
    pub exp: i64,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Principal {
        Principal {
            user: Some(User { id: claims.user_id }),
            admin: claims.admin,
        }
    }
}

pub fn encode_jwt(
    user_id: &str,
    admin: bool,
    exp_day: i64,
    secret: &str,
) -> Result<String, jwt::errors::Error> {
    let exp = Utc::now().timestamp() + exp_day * 24 * 60 * 60;
    let my_claims = Claims {
        user_id: user_id.to_string(),
        admin,
        exp,
    };
    let token = encode(&Header::default(), &my_claims, secret.as_ref())?;

    Ok(token)
}

pub fn verify_jwt(token: &str, secret: &str) -> Result<jwt::TokenData<Claims>, jwt::errors::Error> {
    let validation = Validation::default();

    decode::<Claims>(token, secret.as_ref(), &validation)
}
