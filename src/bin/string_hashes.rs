use hashtrial::{report, Config, Corpus, Workload};

use std::{
    io::{self, Write},
    process,
};

fn main() {
    let config = Config::default();

    let corpus = match Corpus::build(config.n) {
        Ok(corpus) => corpus,
        Err(e) => {
            eprintln!("string_hashes: {}", e);
            process::exit(1);
        }
    };

    let workload = Workload::new(&corpus, config.k);
    let stdout = io::stdout();

    if let Err(e) = run(&workload, &mut stdout.lock()) {
        eprintln!("string_hashes: could not write report: {}", e);
        process::exit(1);
    }
}

fn run<W: Write>(workload: &Workload<'_>, out: &mut W) -> io::Result<()> {
    let log = report::run_all(workload, out)?;
    log.write_summary(out)?;

    out.flush()
}
