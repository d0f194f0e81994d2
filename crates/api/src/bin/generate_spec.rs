//! Prints the OpenAPI document as JSON, for committing alongside clients.

use leettrack_api::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() {
    println!(
        "{}",
        ApiDoc::openapi()
            .to_pretty_json()
            .expect("spec should serialize")
    );
}
