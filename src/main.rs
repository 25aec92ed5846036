//! rworklog main entrypoint.

use rworklog::run;
use rworklog::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
