#![deny(missing_docs)]

//! # Routes Command
//!
//! Lists the demo service's routes and whether each one is documented.

use swagplus_core::{RouteTable, Router, Service, SpecConfig};

use crate::demo;
use crate::error::CliResult;

/// Arguments for the routes command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RoutesArgs {
    /// Only list routes that appear in the document.
    #[clap(long)]
    pub exported_only: bool,
}

/// Renders the route table as aligned text.
pub fn render(service: &Service<Router>, args: &RoutesArgs) -> String {
    let mut rows = vec![[
        "METHODS".to_string(),
        "PATH".to_string(),
        "HANDLER".to_string(),
        "EXPORTED".to_string(),
    ]];
    for route in service.routes().registered_routes() {
        let exported = service.metadata(&route.handler).exported;
        if args.exported_only && !exported {
            continue;
        }
        let methods: Vec<&str> = route.methods.iter().map(|m| m.as_str()).collect();
        rows.push([
            methods.join(","),
            route.path,
            route.handler.to_string(),
            if exported { "yes" } else { "no" }.to_string(),
        ]);
    }

    let mut widths = [0usize; 4];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }
    rows.iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect();
            cells.join("  ").trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Executes the routes command.
pub fn execute(args: &RoutesArgs) -> CliResult<()> {
    let service = demo::service(SpecConfig::default())?;
    println!("{}", render(&service, args));
    Ok(())
}
