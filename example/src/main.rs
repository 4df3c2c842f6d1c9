// example/src/main.rs

use std::collections::HashMap;

use example_app::{Color, LoadError, LoadFromEnv, Service};

fn main() -> Result<(), LoadError> {
    // Values used when neither the environment nor the caller sets a field.
    let defaults = Service {
        name: "example".to_string(),
        tags: vec![Color::Red as i32],
        opts: HashMap::from([("region".to_string(), "local".to_string())]),
        ..Default::default()
    };

    // APP_NAME, APP_TIMEOUT, APP_TAGS, APP_REPORTING_ENDPOINT, ...
    let mut service = Service::from_env("APP_", Some(&defaults))?;
    service.put_all_opts(HashMap::from([("started_by".to_string(), "example".to_string())]));

    println!("name    = {}", service.name);
    println!("timeout = {}", service.timeout.unwrap_or_default());
    for tag in &service.tags {
        let name = Color::try_from(*tag).map(|c| c.as_str_name()).unwrap_or("?");
        println!("tag     = {}", name);
    }
    if let Some(reporting) = &service.reporting {
        println!("reporting.endpoint = {}", reporting.endpoint);
        println!("reporting.port     = {}", reporting.port.unwrap_or_default());
    }
    let mut opts: Vec<_> = service.opts.iter().collect();
    opts.sort();
    for (k, v) in opts {
        println!("opt     {} = {}", k, v);
    }

    Ok(())
}
