//! First-start seeding of professionals from configuration.

use consulta_common::models::NewProfessional;
use consulta_config::BookingConfig;
use consulta_db::{DbError, ProfessionalRepository};
use tracing::info;

/// Inserts `config.seed_professionals` when no professional exists yet.
///
/// Returns how many were inserted; a populated table is left untouched.
pub async fn seed_professionals<P>(professionals: &P, config: &BookingConfig) -> Result<usize, DbError>
where
    P: ProfessionalRepository,
{
    if config.seed_professionals.is_empty() || professionals.count().await? > 0 {
        return Ok(0);
    }

    for seed in &config.seed_professionals {
        professionals
            .create(
                NewProfessional {
                    name: seed.name.clone(),
                    bio: seed.bio.clone(),
                    duration_minutes: seed.duration_minutes,
                    work_start: seed.work_start.clone(),
                    work_end: seed.work_end.clone(),
                },
                config.default_session_minutes,
            )
            .await?;
    }

    info!("Seeded {} professionals", config.seed_professionals.len());
    Ok(config.seed_professionals.len())
}
