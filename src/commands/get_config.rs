use clap::Args;
use common::Configuration;
use common::cli::utils::config_json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Args, Debug)]
pub struct GetConfigArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ParameterRow {
    #[tabled(rename = "Parameter")]
    parameter: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl GetConfigArgs {
    pub fn run(self, config: &Configuration) -> anyhow::Result<()> {
        if self.json {
            println!("{}", config_json(config)?);
        } else {
            println!("{}", parameter_table(config));
        }
        Ok(())
    }
}

fn parameter_table(config: &Configuration) -> String {
    let rows = config
        .parameters()
        .into_iter()
        .map(|(parameter, value)| ParameterRow { parameter, value });
    Table::new(rows).with(Style::modern()).to_string()
}
