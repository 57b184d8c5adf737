//! Completion certificate: rank derivation and the artifact description the
//! SPA renders onto its 800×600 canvas.

use serde::Serialize;

use crate::progress::UserState;

pub const CERT_WIDTH: u32 = 800;
pub const CERT_HEIGHT: u32 = 600;
pub const CERT_FILENAME: &str = "WNT_Certificate.png";
pub const COURSE_TITLE: &str = "WEB3 ARCHITECT & NODE OPERATOR";
pub const ISSUER: &str = "WingsNodeTeam Academy";

/// Four-tier rank derived from the total quiz score (strictly-greater
/// thresholds).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rank {
  Novice,
  Specialist,
  Expert,
  Legend,
}

impl Rank {
  pub fn for_score(score: u32) -> Self {
    if score > 4000 {
      Rank::Legend
    } else if score > 2500 {
      Rank::Expert
    } else if score > 1000 {
      Rank::Specialist
    } else {
      Rank::Novice
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Rank::Legend => "ЛЕГЕНДА",
      Rank::Expert => "ЭКСПЕРТ",
      Rank::Specialist => "СПЕЦИАЛИСТ",
      Rank::Novice => "НОВИЧОК",
    }
  }
}

/// Everything the client needs to draw and download the certificate.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateData {
  pub name: String,
  pub score: u32,
  pub rank: &'static str,
  pub course: &'static str,
  pub issuer: &'static str,
  pub width: u32,
  pub height: u32,
  pub filename: &'static str,
}

pub fn certificate_for(user: &UserState) -> CertificateData {
  CertificateData {
    name: user.name.clone(),
    score: user.score,
    rank: Rank::for_score(user.score).label(),
    course: COURSE_TITLE,
    issuer: ISSUER,
    width: CERT_WIDTH,
    height: CERT_HEIGHT,
    filename: CERT_FILENAME,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rank_thresholds_are_strictly_greater() {
    assert_eq!(Rank::for_score(0), Rank::Novice);
    assert_eq!(Rank::for_score(1000), Rank::Novice);
    assert_eq!(Rank::for_score(1001), Rank::Specialist);
    assert_eq!(Rank::for_score(2500), Rank::Specialist);
    assert_eq!(Rank::for_score(2501), Rank::Expert);
    assert_eq!(Rank::for_score(4000), Rank::Expert);
    assert_eq!(Rank::for_score(4001), Rank::Legend);
  }

  #[test]
  fn certificate_carries_fixed_artifact_shape() {
    let mut user = UserState::new("Нео".into());
    user.score = 4200;
    let cert = certificate_for(&user);
    assert_eq!((cert.width, cert.height), (800, 600));
    assert_eq!(cert.filename, "WNT_Certificate.png");
    assert_eq!(cert.rank, "ЛЕГЕНДА");
    assert_eq!(cert.name, "Нео");
  }
}
