use std::{fmt, str::FromStr};

/// What `submitAnswer` does when the step already carries an answer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResubmissionPolicy {
  Reject,
  Overwrite,
  AppendHistory,
}

impl Default for ResubmissionPolicy {
  fn default() -> Self {
    ResubmissionPolicy::Overwrite
  }
}

impl FromStr for ResubmissionPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "reject" => Ok(ResubmissionPolicy::Reject),
      "overwrite" => Ok(ResubmissionPolicy::Overwrite),
      "append-history" => Ok(ResubmissionPolicy::AppendHistory),
      other => Err(format!(
        "unknown resubmission policy '{}', expected reject, overwrite or append-history",
        other
      )),
    }
  }
}

impl fmt::Display for ResubmissionPolicy {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let name = match *self {
      ResubmissionPolicy::Reject => "reject",
      ResubmissionPolicy::Overwrite => "overwrite",
      ResubmissionPolicy::AppendHistory => "append-history",
    };
    f.write_str(name)
  }
}

#[derive(Clone, Debug)]
pub struct Settings {
  pub jwt_secret: String,
  pub resubmission: ResubmissionPolicy,
}
