use anyhow::Result;
use tracing::info;

use microgrid_sizer::config::AppConfig;
use microgrid_sizer::services::{HydroIndex, RenewablesClient};
use microgrid_sizer::{pipeline, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let cfg = AppConfig::load()?;
    let client = RenewablesClient::new(&cfg.services)?;
    let hydro = match &cfg.hydro_flow_table {
        Some(path) => Some(HydroIndex::from_json_file(path)?),
        None => None,
    };

    info!(
        latitude = cfg.site.latitude,
        longitude = cfg.site.longitude,
        households = cfg.site.households,
        num_days = cfg.site.num_days,
        "sizing off-grid plant"
    );

    let sizing = pipeline::run(&cfg, &client, hydro.as_ref()).await?;
    println!("{}", serde_json::to_string_pretty(&sizing)?);
    Ok(())
}
