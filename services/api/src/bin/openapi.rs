//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document of the Echoverse backend (`GET /` and
//! `GET /health`) as pretty JSON. The output path defaults to `openapi.json`
//! and can be given as the first argument.

use api_lib::web::rest::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let document = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&path, document)?;
    println!("Echoverse backend OpenAPI document written to {}", path.display());
    Ok(())
}
