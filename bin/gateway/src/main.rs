use std::sync::Arc;

use faultline_gateway::{gateway_entrypoint, BooksHandler};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[ntex::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    gateway_entrypoint(Arc::new(BooksHandler::default())).await
}
