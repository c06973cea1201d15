use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing::info;

use crate::connector::Connector;
use crate::item::Item;
use crate::model::ConfigFile;

pub(crate) async fn run(matches: &ArgMatches, conf: ConfigFile) -> Result<()> {
    let input = matches.value_of("input").expect("input file is required");
    let items = read_items(input)?;
    info!("processing {} items from {}", items.len(), input);

    let opts = &conf.config().firefly;
    let client = firefly_api::Builder::new()
        .with_base_url(&opts.base_url)
        .with_token(&opts.access_token)
        .with_trace_id(opts.x_trace_id.clone())
        .build()?;

    let records = Connector::new(&client).run(&items).await?;

    let out_dir = matches.value_of("out").unwrap_or(".");
    for record in &records {
        if let Some(binary) = &record.binary {
            let path = Path::new(out_dir).join(&binary.data.file_name);
            fs::write(&path, &binary.data.data)
                .with_context(|| format!("failed to write attachment {:?}", path))?;
            info!("wrote attachment {:?}", path);
        }
    }

    println!("{}", serde_json::to_string_pretty(&records)?);

    Ok(())
}

fn read_items(path: &str) -> Result<Vec<Item>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("no items file found at: {:?}", path))?;

    serde_json::from_str(&content).context("items file must hold a JSON array of operation items")
}
