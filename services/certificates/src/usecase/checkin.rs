use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::repository::AttendeeRepository;
use crate::domain::types::{Attendee, CHECKIN_TOKEN_SKEW_WINDOWS, CHECKIN_TOKEN_STEP_SECS};
use crate::error::CertificatesServiceError;

type HmacSha256 = Hmac<Sha256>;

fn window_token(secret: &[u8], attendee_id: Uuid, window: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");

    mac.update(format!("{attendee_id}:{window}").as_bytes());

    hex::encode(mac.finalize().into_bytes())
}

/// Token for the attendee's current time window. Rotates every
/// [`CHECKIN_TOKEN_STEP_SECS`] seconds.
pub fn checkin_token(secret: &[u8], attendee_id: Uuid, now: DateTime<Utc>) -> String {
    window_token(secret, attendee_id, now.timestamp().div_euclid(CHECKIN_TOKEN_STEP_SECS))
}

/// When the token returned for `now` stops being the current one. Thanks to
/// the skew allowance scanners accept it a little longer than this.
pub fn token_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    let window = now.timestamp().div_euclid(CHECKIN_TOKEN_STEP_SECS);

    DateTime::from_timestamp((window + 1) * CHECKIN_TOKEN_STEP_SECS, 0)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Accepts the token of the current window plus [`CHECKIN_TOKEN_SKEW_WINDOWS`]
/// windows either side, so a code displayed just before rotation still scans.
pub fn verify_checkin_token(
    secret: &[u8],
    attendee_id: Uuid,
    token: &str,
    now: DateTime<Utc>,
) -> bool {
    let Ok(presented) = hex::decode(token) else {
        return false;
    };

    let current = now.timestamp().div_euclid(CHECKIN_TOKEN_STEP_SECS);

    (current - CHECKIN_TOKEN_SKEW_WINDOWS..=current + CHECKIN_TOKEN_SKEW_WINDOWS).any(|window| {
        let mut mac =
            HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");

        mac.update(format!("{attendee_id}:{window}").as_bytes());

        mac.verify_slice(&presented).is_ok()
    })
}

pub struct CheckInUseCase<A: AttendeeRepository> {
    pub attendee_repo: A,
}

impl<A: AttendeeRepository> CheckInUseCase<A> {
    pub async fn execute(
        &self,
        attendee_id: Uuid,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Attendee, CertificatesServiceError> {
        // 1. The attendee must exist.
        let ctx = self
            .attendee_repo
            .find_context(attendee_id)
            .await?
            .ok_or(CertificatesServiceError::AttendeeNotFound)?;

        // 2. A cancelled registration cannot check in.
        if ctx.attendee.cancelled_at.is_some() {
            return Err(CertificatesServiceError::RegistrationCancelled);
        }

        // 3. Re-scanning an already recorded attendee is a no-op.
        if ctx.attendee.attended_at.is_some() {
            return Ok(ctx.attendee);
        }

        // 4. The presented token must match a recent window.
        if !verify_checkin_token(ctx.attendee.checkin_secret.as_bytes(), attendee_id, token, now) {
            return Err(CertificatesServiceError::InvalidCheckinToken);
        }

        // 5. Record attendance.
        let attendee = self.attendee_repo.mark_attended(attendee_id, now).await?;

        tracing::info!(attendee_id = %attendee_id, "attendee checked in");

        Ok(attendee)
    }
}

#[derive(Debug, Clone)]
pub struct CheckinToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct CheckInTokenUseCase<A: AttendeeRepository> {
    pub attendee_repo: A,
}

impl<A: AttendeeRepository> CheckInTokenUseCase<A> {
    pub async fn execute(
        &self,
        attendee_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CheckinToken, CertificatesServiceError> {
        let ctx = self
            .attendee_repo
            .find_context(attendee_id)
            .await?
            .ok_or(CertificatesServiceError::AttendeeNotFound)?;

        if ctx.attendee.cancelled_at.is_some() {
            return Err(CertificatesServiceError::RegistrationCancelled);
        }

        Ok(CheckinToken {
            token: checkin_token(ctx.attendee.checkin_secret.as_bytes(), attendee_id, now),
            expires_at: token_expiry(now),
        })
    }
}
