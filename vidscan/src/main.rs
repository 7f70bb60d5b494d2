mod application;
mod presentation {
    pub mod cli;
}

fn main() -> vidscan_core::error::Result<()> {
    application::run()
}
