// ---------------------------------------------------------------------------
// RecommenderServer — JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Routes incoming JSON-RPC 2.0 requests (NDJSON over stdin) to a
// RecommenderService: a main `run()` loop, a `dispatch()` match, a
// `with_model` helper, and free-standing handler functions per method.
//
//   model/load  { path }                              -> model info
//   model/info  {}                                    -> model info
//   recommend   { courseName, topN?, ratingWeight? }  -> { recommendations }
// ---------------------------------------------------------------------------

use std::io::{self, BufRead};

use crate::config::{DEFAULT_RATING_WEIGHT, DEFAULT_TOP_N};
use crate::error::RecommenderError;
use crate::protocol::*;
use crate::recommender::{FittedModel, RecommenderService};
use crate::transport::NdjsonTransport;

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub struct RecommenderServer {
	transport: NdjsonTransport,
	service: RecommenderService,
}

impl RecommenderServer {
	/// Create a server around `service`. An unfitted service answers queries
	/// with `RECOMMENDER_NOT_FITTED` until `model/load` succeeds.
	pub fn new(transport: NdjsonTransport, service: RecommenderService) -> Self {
		Self { transport, service }
	}

	/// Main loop: read JSON-RPC messages from stdin, dispatch to handlers.
	pub fn run(&mut self) -> Result<(), RecommenderError> {
		let stdin = io::stdin();
		let reader = stdin.lock();

		for line_result in reader.lines() {
			let line = line_result?;
			if line.trim().is_empty() {
				continue;
			}

			let request: JsonRpcRequest = match serde_json::from_str(&line) {
				Ok(r) => r,
				Err(e) => {
					tracing::error!("Failed to parse request: {}", e);
					continue;
				}
			};

			self.dispatch(request);
		}

		Ok(())
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		tracing::debug!(id, method = %req.method, "Request");
		let result = match req.method.as_str() {
			"model/load" => handle_load(&mut self.service, req.params),
			"model/info" => self.with_model(|m| to_value(&m.info())),
			"recommend" => self.with_model(|m| handle_recommend(m, req.params)),
			_ => {
				self.transport.write_error(
					id,
					METHOD_NOT_FOUND,
					format!("Unknown method: {}", req.method),
					None,
				);
				return;
			}
		};

		match result {
			Ok(value) => self.transport.write_response(id, value),
			Err(e) => {
				let code = match &e {
					RecommenderError::InvalidParams(_) => INVALID_PARAMS,
					_ => RECOMMENDER_ERROR,
				};
				self.transport
					.write_error(id, code, e.to_string(), Some(e.to_json_rpc_error()))
			}
		}
	}

	fn with_model<F>(&self, f: F) -> Result<serde_json::Value, RecommenderError>
	where
		F: FnOnce(&FittedModel) -> Result<serde_json::Value, RecommenderError>,
	{
		f(self.service.model()?)
	}
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn parse_params<T: serde::de::DeserializeOwned>(
	params: serde_json::Value,
) -> Result<T, RecommenderError> {
	serde_json::from_value(params).map_err(|e| RecommenderError::InvalidParams(e.to_string()))
}

fn to_value(value: &impl serde::Serialize) -> Result<serde_json::Value, RecommenderError> {
	serde_json::to_value(value).map_err(|e| RecommenderError::Serialization(e.to_string()))
}

fn handle_load(
	service: &mut RecommenderService,
	params: serde_json::Value,
) -> Result<serde_json::Value, RecommenderError> {
	let p: LoadParams = parse_params(params)?;
	service.load(&p.path)?;
	to_value(&service.model()?.info())
}

fn handle_recommend(
	model: &FittedModel,
	params: serde_json::Value,
) -> Result<serde_json::Value, RecommenderError> {
	let p: RecommendParams = parse_params(params)?;
	let rating_weight = p.rating_weight.unwrap_or(DEFAULT_RATING_WEIGHT);
	if !rating_weight.is_finite() {
		return Err(RecommenderError::InvalidParams(
			"ratingWeight must be a finite number".into(),
		));
	}
	let recommendations =
		model.recommend(&p.course_name, p.top_n.unwrap_or(DEFAULT_TOP_N), rating_weight);
	Ok(serde_json::json!({ "recommendations": recommendations }))
}
