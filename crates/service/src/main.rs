use std::sync::Arc;

use anyhow::Context;

use warden_core::RequestContext;
use warden_infra::InMemoryEntityStore;
use warden_service::{AuthorizationUsecase, SeedPlan, WardenConfig, bootstrap};

fn main() -> anyhow::Result<()> {
    warden_observability::init_with(&WardenConfig::logging_from_env());

    let config = WardenConfig::from_env();
    let store = Arc::new(InMemoryEntityStore::new());
    let usecase = AuthorizationUsecase::with_limits(
        store,
        Arc::new(config.credentials.hasher()),
        config.pagination.limits(),
    );

    let report = bootstrap(
        &usecase,
        &RequestContext::background(),
        &SeedPlan::from_config(&config.seed),
    )
    .context("bootstrap failed")?;

    tracing::info!(admin_user = ?report.admin_user, "seed complete");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
