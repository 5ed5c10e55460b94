mod entry;
mod logger;
mod shutdown_handlers;

use trickle::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
