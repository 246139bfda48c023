//! Regions command implementation
//!
//! Runs a scheduling pass over one or more named regions, each tiled into
//! patches of `metres_per_polygon`.

use super::schedule::{run_pass, ScheduleArgs};
use crate::config::load_config;
use crate::core::regions::{region_names, require_region};
use crate::core::season::Season;
use crate::domain::{DateRange, ScheduleInput};
use chrono::{NaiveDate, Utc};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the regions command
#[derive(Args, Debug)]
pub struct RegionsArgs {
    /// Region names (e.g. Kenya, Busia, Togo)
    #[arg(required = true, num_args = 1..)]
    pub names: Vec<String>,

    /// Export the in-season or post-season date range (in or post)
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub season: Option<Season>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Edge length in metres of each exported polygon
    #[arg(long, value_name = "METRES")]
    pub metres_per_polygon: Option<f64>,

    /// Export each region as a single polygon
    #[arg(long, conflicts_with = "metres_per_polygon")]
    pub single_polygon: bool,

    #[command(flatten)]
    pub schedule: ScheduleArgs,
}

impl RegionsArgs {
    /// Date range selected by `--season` or `--start`/`--end`
    fn date_range(
        &self,
        days_per_timestep: u32,
        num_timesteps: u32,
    ) -> crate::domain::Result<DateRange> {
        match self.season {
            Some(season) => season.date_range(Utc::now().date_naive()),
            None => DateRange::resolve(self.start, self.end, days_per_timestep, num_timesteps),
        }
    }

    /// Execute the regions command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(regions = ?self.names, "Starting regions command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };
        self.schedule.apply(&mut config);

        let dates = match self.date_range(
            config.export.days_per_timestep,
            config.export.num_timesteps,
        ) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let metres_per_polygon = if self.single_polygon {
            None
        } else {
            self.metres_per_polygon.or(config.export.metres_per_polygon)
        };

        let mut inputs = Vec::with_capacity(self.names.len());
        for name in &self.names {
            match require_region(name) {
                Ok(bbox) => inputs.push(ScheduleInput::Region {
                    name: name.clone(),
                    bbox,
                    dates,
                    metres_per_polygon,
                }),
                Err(e) => {
                    eprintln!("❌ {e}");
                    eprintln!("   Known regions: {}", region_names().join(", "));
                    return Ok(2);
                }
            }
        }

        println!("🗺️  Regions: {}", self.names.join(", "));
        println!("   Dates: {} to {}", dates.start(), dates.end());
        match metres_per_polygon {
            Some(metres) => println!("   Polygon size: {metres} m"),
            None => println!("   Polygon size: whole region"),
        }

        run_pass(config, inputs, shutdown_signal).await
    }
}
