mod audio;
mod cli;
mod config;
mod library;
mod player;
mod runtime;
mod server;

#[cfg(test)]
mod testing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
