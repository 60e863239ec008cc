use std::{env::current_dir, fs::write, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use svd_core::{
    calendar,
    options::{CompanyForm, FiscalYearEndMonth, Options, Turnover, VatPeriod},
    skatteverket_client::SkatteverketClient,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
pub struct Arguments {
    /// the legal form of the company
    #[arg(long, default_value_t)]
    pub foretagsform: CompanyForm,
    /// how often VAT is reported
    #[arg(long, default_value_t)]
    pub momsredovisningsperiod: VatPeriod,
    /// the yearly turnover bracket
    #[arg(long, default_value_t)]
    pub omsattning: Turnover,
    /// the last month of the fiscal year
    #[arg(long, default_value_t)]
    pub rakenskapsarets_sista_manad: FiscalYearEndMonth,
    /// include dates for employers
    #[arg(long)]
    pub arbetsgivare: bool,
    /// where to write the calendar, defaults to `calendar.ics` in the current directory
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl From<&Arguments> for Options {
    fn from(value: &Arguments) -> Self {
        Options {
            company_form: value.foretagsform,
            vat_period: value.momsredovisningsperiod,
            turnover: value.omsattning,
            fiscal_year_end_month: value.rakenskapsarets_sista_manad,
            include_employer_events: value.arbetsgivare,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Arguments::parse();
    let calendar = calendar::get(&SkatteverketClient::default(), &Options::from(&args)).await?;
    let path = match args.output {
        Some(path) => path,
        None => current_dir()?.join("calendar.ics"),
    };
    write(&path, calendar.generate())?;
    tracing::info!(
        events = calendar.events.len(),
        "wrote {} to {}",
        calendar.name(),
        path.display()
    );
    Ok(())
}
