use anyhow::{Context, Result};
use clap::Parser;
use coursemate_recommender::config::{CliArgs, Command};
use coursemate_recommender::server::RecommenderServer;
use coursemate_recommender::transport::NdjsonTransport;
use coursemate_recommender::{Dataset, FittedModel, RecommenderService};

fn main() -> Result<()> {
	let args = CliArgs::parse();

	// Logs go to stderr; stdout carries command output and JSON-RPC responses
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	let config = args.command.recommender_config();
	match args.command {
		Command::Train { data, output, .. } => {
			tracing::info!(data = %data.display(), "Loading course dataset");
			let dataset = Dataset::from_csv_path(&data)
				.with_context(|| format!("failed to read dataset {}", data.display()))?;
			let model = FittedModel::fit(&dataset, &config)?;
			model.save(&output)?;
			println!("{}", serde_json::to_string_pretty(&model.info())?);
		}
		Command::Recommend {
			model,
			course,
			top_n,
			rating_weight,
		} => {
			let fitted = FittedModel::load(&model)
				.with_context(|| format!("failed to load model {}", model.display()))?;
			let recommendations = fitted.recommend(&course, top_n, rating_weight);
			println!("{}", serde_json::to_string_pretty(&recommendations)?);
		}
		Command::Info { model } => {
			let fitted = FittedModel::load(&model)
				.with_context(|| format!("failed to load model {}", model.display()))?;
			println!("{}", serde_json::to_string_pretty(&fitted.info())?);
		}
		Command::Serve { model } => {
			let mut service = RecommenderService::new(config);
			if let Some(path) = model {
				service
					.load(&path)
					.with_context(|| format!("failed to load model {}", path.display()))?;
			}

			let transport = NdjsonTransport::new();
			let mut server = RecommenderServer::new(transport, service);

			tracing::info!("coursemate-recommender ready");
			server.run()?;
		}
	}

	Ok(())
}
