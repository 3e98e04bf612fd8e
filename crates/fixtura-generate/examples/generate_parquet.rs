use std::env;
use std::path::PathBuf;

use fixtura_generate::{GenerateOptions, GenerationEngine};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut options = GenerateOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--registries" => {
                options.registry_count = args.next().ok_or("missing --registries value")?.parse()?
            }
            "--orders" => options.order_count = args.next().ok_or("missing --orders value")?.parse()?,
            "--seed" => options.seed = Some(args.next().ok_or("missing --seed value")?.parse()?),
            "--out" => options.out_dir = args.next().map(PathBuf::from).ok_or("missing --out value")?,
            _ => return Err(format!("unexpected argument '{arg}'").into()),
        }
    }

    let result = GenerationEngine::new(options).run()?;

    println!("registry={}", result.registry_path.display());
    println!("orders={}", result.orders_path.display());
    println!("seed={}", result.report.seed);
    Ok(())
}
