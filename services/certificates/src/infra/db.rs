use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Datelike, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use acara_certificates_schema::{
    attendees, certificate_sequences, certificate_templates, certificates, events, registrations,
    rooms,
};

use crate::domain::number::{format_number, year_bounds};
use crate::domain::repository::{AllocationError, AttendeeRepository, CertificateRepository};
use crate::domain::types::{
    Attendee, AttendeeContext, Certificate, CertificateDraft, CertificateStatus, EventSummary,
    MAX_SEQUENCE_ATTEMPTS, TemplateInfo, VerificationRecord,
};

#[derive(Clone)]
pub struct DbAttendeeRepository {
    pub db: Arc<DatabaseConnection>,
}

impl AttendeeRepository for DbAttendeeRepository {
    async fn find_context(&self, attendee_id: Uuid) -> anyhow::Result<Option<AttendeeContext>> {
        let Some(attendee) = attendees::Entity::find_by_id(attendee_id)
            .one(self.db.as_ref())
            .await
            .context("select attendee")?
        else {
            return Ok(None);
        };

        // The chain attendee -> registration -> event is NOT NULL; a missing
        // target row is corrupt data, not a client error.
        let registration = registrations::Entity::find_by_id(attendee.registration_id)
            .one(self.db.as_ref())
            .await
            .context("select registration")?
            .with_context(|| {
                format!("registration {} missing for attendee {attendee_id}", attendee.registration_id)
            })?;

        let event = events::Entity::find_by_id(registration.event_id)
            .one(self.db.as_ref())
            .await
            .context("select event")?
            .with_context(|| {
                format!("event {} missing for registration {}", registration.event_id, registration.id)
            })?;

        // Room and template references are SET NULL on delete; absence is fine.
        let venue = match event.room_id {
            Some(room_id) => rooms::Entity::find_by_id(room_id)
                .one(self.db.as_ref())
                .await
                .context("select room")?
                .map(|room| room.name),
            None => None,
        };

        let template = match event.certificate_template_id {
            Some(template_id) => certificate_templates::Entity::find_by_id(template_id)
                .one(self.db.as_ref())
                .await
                .context("select certificate template")?
                .map(|template| TemplateInfo {
                    theme: template.theme,
                    config: template.config.as_object().cloned().unwrap_or_default(),
                }),
            None => None,
        };

        Ok(Some(AttendeeContext {
            attendee: attendee_from_model(attendee),
            event: EventSummary {
                id: event.id,
                name: event.name,
                organizer: event.organizer,
                start_time: event.start_time,
                certificate_enabled: event.certificate_enabled,
                venue,
                template,
            },
        }))
    }

    async fn mark_attended(
        &self,
        attendee_id: Uuid,
        attended_at: DateTime<Utc>,
    ) -> anyhow::Result<Attendee> {
        let attendee = attendees::ActiveModel {
            id: Set(attendee_id),
            attended_at: Set(Some(attended_at)),
            ..Default::default()
        }
        .update(self.db.as_ref())
        .await
        .context("update attendee attendance")?;

        Ok(attendee_from_model(attendee))
    }
}

/// Error type of the allocation transaction closure.
#[derive(Debug, thiserror::Error)]
enum AllocateTxError {
    #[error("no free number within the attempt limit")]
    Exhausted,
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

#[derive(Clone)]
pub struct DbCertificateRepository {
    pub db: Arc<DatabaseConnection>,
}

impl CertificateRepository for DbCertificateRepository {
    async fn find_valid_by_attendee(
        &self,
        attendee_id: Uuid,
    ) -> anyhow::Result<Option<Certificate>> {
        certificates::Entity::find()
            .filter(certificates::Column::AttendeeId.eq(attendee_id))
            .filter(certificates::Column::Status.eq(CertificateStatus::Valid.as_str()))
            .one(self.db.as_ref())
            .await
            .context("select valid certificate")?
            .map(certificate_from_model)
            .transpose()
    }

    async fn find_for_verification(
        &self,
        certificate_id: Uuid,
    ) -> anyhow::Result<Option<VerificationRecord>> {
        let Some(certificate) = certificates::Entity::find_by_id(certificate_id)
            .one(self.db.as_ref())
            .await
            .context("select certificate")?
        else {
            return Ok(None);
        };

        let attendee = attendees::Entity::find_by_id(certificate.attendee_id)
            .one(self.db.as_ref())
            .await
            .context("select attendee")?
            .with_context(|| {
                format!("attendee {} missing for certificate {certificate_id}", certificate.attendee_id)
            })?;

        let registration = registrations::Entity::find_by_id(attendee.registration_id)
            .one(self.db.as_ref())
            .await
            .context("select registration")?
            .with_context(|| {
                format!("registration {} missing for attendee {}", attendee.registration_id, attendee.id)
            })?;

        let event = events::Entity::find_by_id(registration.event_id)
            .one(self.db.as_ref())
            .await
            .context("select event")?
            .with_context(|| {
                format!("event {} missing for registration {}", registration.event_id, registration.id)
            })?;

        Ok(Some(VerificationRecord {
            certificate: certificate_from_model(certificate)?,
            attendee_name: attendee.name,
            event_name: event.name,
            event_start_time: event.start_time,
            event_organizer: event.organizer,
        }))
    }

    async fn create_numbered(
        &self,
        draft: CertificateDraft,
    ) -> Result<Certificate, AllocationError> {
        let year = draft.issued_at.year();
        let (start, end) = year_bounds(year)
            .ok_or_else(|| anyhow::anyhow!("issuance year {year} out of range"))
            .map_err(AllocationError::Other)?;

        let result = self
            .db
            .transaction::<_, certificates::Model, AllocateTxError>(move |txn| {
                Box::pin(async move {
                    // 1. Ensure the per-year row exists, then take the year
                    //    lock. Concurrent allocators queue on this SELECT.
                    certificate_sequences::Entity::insert(certificate_sequences::ActiveModel {
                        year: Set(year),
                        updated_at: Set(draft.issued_at),
                    })
                    .on_conflict(
                        OnConflict::column(certificate_sequences::Column::Year)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;

                    certificate_sequences::Entity::find_by_id(year)
                        .lock_exclusive()
                        .one(txn)
                        .await?;

                    // 2. The lock also serializes same-attendee races: a
                    //    valid certificate that landed after the caller's
                    //    idempotency check is returned, not duplicated.
                    if let Some(existing) = certificates::Entity::find()
                        .filter(certificates::Column::AttendeeId.eq(draft.attendee_id))
                        .filter(
                            certificates::Column::Status.eq(CertificateStatus::Valid.as_str()),
                        )
                        .one(txn)
                        .await?
                    {
                        return Ok(existing);
                    }

                    // 3. Count this year's certificates under the lock.
                    let count = certificates::Entity::find()
                        .filter(certificates::Column::IssuedAt.gte(start))
                        .filter(certificates::Column::IssuedAt.lt(end))
                        .count(txn)
                        .await?;

                    // 4. Probe past numbers taken by manual edits.
                    let mut seq = count as u32 + 1;
                    for _ in 0..MAX_SEQUENCE_ATTEMPTS {
                        let number = format_number(seq, draft.issued_at);

                        let taken = certificates::Entity::find()
                            .filter(certificates::Column::Number.eq(&number))
                            .count(txn)
                            .await?
                            > 0;

                        if !taken {
                            // 5. Record the issuance on the lock row and
                            //    insert while the lock is still held.
                            certificate_sequences::ActiveModel {
                                year: Set(year),
                                updated_at: Set(draft.issued_at),
                            }
                            .update(txn)
                            .await?;

                            let model = certificates::ActiveModel {
                                id: Set(draft.id),
                                attendee_id: Set(draft.attendee_id),
                                number: Set(number),
                                file_key: Set(None),
                                status: Set(CertificateStatus::Valid.as_str().to_owned()),
                                issued_at: Set(draft.issued_at),
                                created_at: Set(draft.issued_at),
                            }
                            .insert(txn)
                            .await?;

                            return Ok(model);
                        }

                        seq += 1;
                    }

                    Err(AllocateTxError::Exhausted)
                })
            })
            .await;

        match result {
            Ok(model) => certificate_from_model(model).map_err(AllocationError::Other),
            Err(TransactionError::Transaction(AllocateTxError::Exhausted)) => {
                Err(AllocationError::Exhausted)
            }
            Err(TransactionError::Transaction(AllocateTxError::Db(e))) => Err(
                AllocationError::Other(anyhow::Error::from(e).context("allocate certificate number")),
            ),
            Err(TransactionError::Connection(e)) => Err(AllocationError::Other(
                anyhow::Error::from(e).context("open allocation transaction"),
            )),
        }
    }

    async fn set_file_key(&self, certificate_id: Uuid, file_key: &str) -> anyhow::Result<()> {
        certificates::ActiveModel {
            id: Set(certificate_id),
            file_key: Set(Some(file_key.to_owned())),
            ..Default::default()
        }
        .update(self.db.as_ref())
        .await
        .context("update certificate file key")?;

        Ok(())
    }
}

fn attendee_from_model(model: attendees::Model) -> Attendee {
    Attendee {
        id: model.id,
        name: model.name,
        phone: model.phone,
        checkin_secret: model.checkin_secret,
        attended_at: model.attended_at,
        cancelled_at: model.cancelled_at,
    }
}

fn certificate_from_model(model: certificates::Model) -> anyhow::Result<Certificate> {
    let status = CertificateStatus::parse(&model.status)
        .with_context(|| format!("unknown certificate status {:?}", model.status))?;

    Ok(Certificate {
        id: model.id,
        attendee_id: model.attendee_id,
        number: model.number,
        file_key: model.file_key,
        status,
        issued_at: model.issued_at,
        created_at: model.created_at,
    })
}
