//! Minimal viewfinder demo: a synthetic capture stream presented
//! full-window with crop-to-fill scaling.
//!
//! Run with `RUST_LOG=info cargo run --example viewfinder_demo`.

fn main() -> viewfinder::Result<()> {
    viewfinder::show()
}
