//! services/api/src/bin/openapi.rs
//!
//! Prints the OpenAPI specification to stdout so the client can be generated
//! without a running server.

use api_lib::web::ApiDoc;
use utoipa::OpenApi;

fn main() {
    match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("failed to serialize the OpenAPI spec: {e}");
            std::process::exit(1);
        }
    }
}
