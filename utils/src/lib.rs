#[macro_use]
extern crate log;

use std::{fmt, io::BufRead, num::NonZeroUsize, panic, path::Path, str::FromStr, thread};

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use compress_io::compress::CompressIo;
use crossbeam_channel::{unbounded, Receiver};

/// LogLevel
///
/// Represents minimum level of messages that will be logged
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevel {
    pub level: usize,
}

impl FromStr for LogLevel {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel { level: 0 }),
            "warn" => Ok(LogLevel { level: 1 }),
            "info" => Ok(LogLevel { level: 2 }),
            "debug" => Ok(LogLevel { level: 3 }),
            "trace" => Ok(LogLevel { level: 4 }),
            "none" => Ok(LogLevel { level: 5 }),
            _ => Err("no match"),
        }
    }
}

impl LogLevel {
    pub fn is_none(&self) -> bool {
        self.level > 4
    }
    pub fn get_level(&self) -> usize {
        if self.level > 4 {
            0
        } else {
            self.level
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let level_str = ["error", "warn", "info", "debug", "trace", "none"];
        if self.level < 6 {
            write!(f, "{}", level_str[self.level])
        } else {
            write!(f, "unknown")
        }
    }
}

/// Add the options shared by all tools (logging and threads) to a command
pub fn common_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("timestamp")
            .short('X')
            .long("timestamp")
            .value_parser(value_parser!(stderrlog::Timestamp))
            .value_name("GRANULARITY")
            .default_value("none")
            .help("Prepend log entries with a timestamp"),
    )
    .arg(
        Arg::new("loglevel")
            .short('l')
            .long("loglevel")
            .value_name("LOGLEVEL")
            .value_parser(value_parser!(LogLevel))
            .ignore_case(true)
            .default_value("warn")
            .help("Set log level"),
    )
    .arg(
        Arg::new("quiet")
            .action(ArgAction::SetTrue)
            .long("quiet")
            .conflicts_with("loglevel")
            .help("Silence all output"),
    )
    .arg(
        Arg::new("threads")
            .short('t')
            .long("threads")
            .value_parser(value_parser!(NonZeroUsize))
            .value_name("INT")
            .help("Set number of calculation threads [default: available cores]"),
    )
}

/// Initialize logging from command line arguments
pub fn init_log(m: &ArgMatches) {
    let verbose = m
        .get_one::<LogLevel>("loglevel")
        .copied()
        .unwrap_or(LogLevel { level: 2 });
    let quiet = verbose.is_none() || m.get_flag("quiet");
    let ts = m
        .get_one::<stderrlog::Timestamp>("timestamp")
        .copied()
        .unwrap_or(stderrlog::Timestamp::Off);

    if let Err(e) = stderrlog::new()
        .quiet(quiet)
        .verbosity(verbose.get_level())
        .timestamp(ts)
        .init()
    {
        eprintln!("Could not initialize logging: {}", e)
    }
}

/// Number of worker threads requested on the command line
pub fn get_threads(m: &ArgMatches) -> usize {
    m.get_one::<NonZeroUsize>("threads")
        .map(|x| usize::from(*x))
        .unwrap_or_else(num_cpus::get)
}

/// Read in next line and split on tabs after trimming white space
pub fn get_next_line<'a, R: BufRead>(
    rdr: &mut R,
    buf: &'a mut String,
) -> anyhow::Result<Option<Vec<&'a str>>> {
    buf.clear();
    if rdr.read_line(buf)? == 0 {
        Ok(None)
    } else {
        Ok(Some(buf.trim().split('\t').collect()))
    }
}

/// Read a list file (one entry per line, first tab separated field is used).
/// Empty lines and lines starting with '#' are skipped
pub fn read_list_file<P: AsRef<Path>>(fname: P) -> anyhow::Result<Vec<String>> {
    let fname = fname.as_ref();
    debug!("Reading in list from {}", fname.display());
    let rdr = CompressIo::new()
        .path(fname)
        .bufreader()
        .with_context(|| format!("Could not open list file {}", fname.display()))?;
    read_list(rdr).with_context(|| format!("Error reading list file {}", fname.display()))
}

fn read_list<R: BufRead>(mut rdr: R) -> anyhow::Result<Vec<String>> {
    let mut buf = String::new();
    let mut line = 0;
    let mut v = Vec::new();
    while let Some(fields) = get_next_line(&mut rdr, &mut buf)
        .with_context(|| format!("Error after reading {} lines", line))?
    {
        line += 1;
        match fields.first() {
            Some(s) if !s.is_empty() && !s.starts_with('#') => v.push((*s).to_owned()),
            _ => (),
        }
    }
    trace!("Finished reading {} lines; found {} entries", line, v.len());
    Ok(v)
}

/// Process items using a pool of nt worker threads.
///
/// Items are sent to the workers over a channel; each worker returns the results
/// for the items it processed when the channel is closed.  Results are returned in the
/// same order as items.  A failure in one job does not affect the others.  A panic in
/// a worker thread is propagated to the caller
pub fn process_parallel<T, R, E, F>(items: &[T], nt: usize, f: F) -> Vec<Result<R, E>>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync,
{
    let nt = nt.clamp(1, items.len().max(1));
    let mut results: Vec<Option<Result<R, E>>> = items.iter().map(|_| None).collect();
    let f = &f;

    // Everything runs within a scope so that we can pass references to the threads
    thread::scope(|sc| {
        trace!("Spawning {} worker threads for {} jobs", nt, items.len());
        let (snd, rcv) = unbounded::<(usize, &T)>();
        let jobs: Vec<_> = (0..nt)
            .map(|i| {
                let r = rcv.clone();
                sc.spawn(move || worker(i + 1, r, f))
            })
            .collect();
        drop(rcv);

        for job in items.iter().enumerate() {
            if snd.send(job).is_err() {
                error!("Error sending message to worker threads");
                break;
            }
        }
        drop(snd);

        for (ix, jh) in jobs.into_iter().enumerate() {
            match jh.join() {
                Ok(v) => {
                    for (i, res) in v {
                        results[i] = Some(res)
                    }
                }
                Err(e) => {
                    error!("Worker thread {} panicked", ix + 1);
                    panic::resume_unwind(e)
                }
            }
        }
    });

    // Every job has been received by a worker that exited normally
    results.into_iter().flatten().collect()
}

fn worker<T, R, E, F>(ix: usize, r: Receiver<(usize, &T)>, f: &F) -> Vec<(usize, Result<R, E>)>
where
    F: Fn(&T) -> Result<R, E>,
{
    trace!("Starting up worker thread {}", ix);
    let mut v = Vec::new();
    while let Ok((i, item)) = r.recv() {
        trace!("Worker {} processing job {}", ix, i);
        v.push((i, f(item)))
    }
    trace!("Closing down worker thread {}", ix);
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(16)]
    fn parallel_results_keep_input_order(#[case] nt: usize) {
        let items: Vec<usize> = (0..10).collect();
        let res = process_parallel(&items, nt, |x| {
            if *x == 4 {
                Err(anyhow::anyhow!("bad item"))
            } else {
                Ok(x * 2)
            }
        });
        assert_eq!(res.len(), 10);
        for (i, r) in res.iter().enumerate() {
            match r {
                Ok(y) => assert_eq!(*y, i * 2),
                Err(_) => assert_eq!(i, 4),
            }
        }
    }

    #[test]
    fn parallel_with_no_items() {
        let items: Vec<u8> = Vec::new();
        let res = process_parallel(&items, 4, |x| Ok::<_, String>(*x));
        assert!(res.is_empty());
    }

    #[test]
    fn parallel_with_plain_error_type() {
        let items = ["1", "x", "3"];
        let res = process_parallel(&items, 2, |s| s.parse::<u32>());
        assert_eq!(res.len(), 3);
        assert_eq!(res[0], Ok(1));
        assert!(res[1].is_err());
        assert_eq!(res[2], Ok(3));
    }

    #[rstest]
    #[case("error", 0)]
    #[case("WARN", 1)]
    #[case("Info", 2)]
    #[case("trace", 4)]
    #[case("none", 5)]
    fn parse_log_level(#[case] s: &str, #[case] level: usize) {
        let l = LogLevel::from_str(s).unwrap();
        assert_eq!(l.level, level);
        assert_eq!(l.to_string(), s.to_lowercase());
    }

    #[test]
    fn none_level_is_quiet() {
        let l = LogLevel::from_str("none").unwrap();
        assert!(l.is_none());
        assert_eq!(l.get_level(), 0);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn list_skips_blank_and_comment_lines() {
        let input = "cell_1\n\n# header\ncell_2\textra\n  cell_3  \n";
        let v = read_list(input.as_bytes()).unwrap();
        assert_eq!(v, vec!["cell_1", "cell_2", "cell_3"]);
    }
}
