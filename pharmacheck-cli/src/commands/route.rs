//! Route command implementation.

use anyhow::Result;
use pharmacheck_core::{Presentation, Route};
use serde_json::Value;

use crate::utils::print_page;
use crate::Output;

fn describe(route: &Route) -> String {
    match route {
        Route::Home => "home: scanner".to_string(),
        Route::Demo(Presentation::Valid) => "demo: verified product".to_string(),
        Route::Demo(Presentation::Counterfeit) => "demo: counterfeit alert".to_string(),
        Route::Demo(Presentation::Undefined) => "demo: unverifiable product".to_string(),
        Route::Product(id) => format!("product: {id}"),
        Route::NotFound => "not found".to_string(),
    }
}

/// The route tag, plus the rendered page when there is one.
fn route_json(route: &Route) -> Result<Value> {
    let mut doc = serde_json::to_value(route)?;
    if let (Some(page), Some(map)) = (route.page(), doc.as_object_mut()) {
        map.insert("page".to_string(), serde_json::to_value(page)?);
    }
    Ok(doc)
}

/// Execute the route command.
pub fn execute(path: &str, out: Output) -> Result<()> {
    let route = Route::parse(path);

    if out.json {
        println!("{}", route_json(&route)?);
    } else if !out.quiet {
        println!("{}", describe(&route));
        if let Some(page) = route.page() {
            print_page(&page);
        }
    }
    Ok(())
}
