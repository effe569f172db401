use integrity_launcher::{
    ExecImage, LaunchError, Launcher, OwnershipOracle, ProcessDescriptors, ResIdCredentials,
    UntrustedCommand, UNTRUSTED_IDENTITY,
};
use log::{error, LevelFilter};
use simple_logger::SimpleLogger;

fn main() {
    // Logging is best effort, failing to set it up must not prevent the launch
    let logging = SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .is_ok();

    let command = match UntrustedCommand::from_args(std::env::args_os()) {
        Ok(command) => command,
        Err(LaunchError::MissingProgram) => {
            eprintln!("Usage: launcher PROGRAM [ARGS...]");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("launcher: {}", e);
            std::process::exit(1);
        }
    };

    let oracle = OwnershipOracle::new(UNTRUSTED_IDENTITY);
    let mut descriptors = ProcessDescriptors::new();
    let credentials = ResIdCredentials::new();
    let image = ExecImage::new();
    let mut launcher = Launcher::new(
        UNTRUSTED_IDENTITY,
        command,
        &oracle,
        &mut descriptors,
        &credentials,
        &image,
    );
    let err = launcher.run();
    if logging {
        error!("Launch aborted: {}", err);
    } else {
        eprintln!("launcher: launch aborted: {}", err);
    }
    std::process::exit(1);
}
