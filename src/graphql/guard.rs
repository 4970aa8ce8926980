use crate::CWError;

#[derive(Clone, Debug, PartialEq)]
pub struct User {
  pub id: String,
}

/// Who is calling. Established from the request before any resolver runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Principal {
  pub user: Option<User>,
  pub admin: bool,
}

impl Principal {
  pub fn anonymous() -> Self {
    Self::default()
  }

  pub fn learner<S: Into<String>>(id: S) -> Self {
    Principal {
      user: Some(User { id: id.into() }),
      admin: false,
    }
  }

  pub fn admin<S: Into<String>>(id: S) -> Self {
    Principal {
      user: Some(User { id: id.into() }),
      admin: true,
    }
  }

  pub fn require_admin(&self) -> Result<(), CWError> {
    if !self.admin {
      debug!("Rejected non-admin caller {:?}", self.user);
      return Err(CWError::Unauthorized("admins"));
    }
    Ok(())
  }

  pub fn require_user(&self) -> Result<&User, CWError> {
    self.user.as_ref().ok_or_else(|| {
      debug!("Rejected anonymous caller");
      CWError::Unauthorized("loggedIn users")
    })
  }
}
