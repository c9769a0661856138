use clap::Parser;
use log::LevelFilter;

/// Command line interface, interpreted by clap.
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "A block-sorting file compressor",
    long_about = "Compresses files into the bzip2 format: run-length pre-coding, a \
Burrows-Wheeler block sort, move-to-front recoding and multi-table Huffman \
coding. Compression only; use bzip2 or bunzip2 to decompress the output."
)]
pub struct Args {
    /// Files to compress; standard input when none are given
    #[clap()]
    pub files: Vec<String>,

    /// Block size in 100kB units (1-9); chosen from the input size when unset
    #[clap(short = 'b', long = "block-size")]
    pub block_size: Option<usize>,

    /// Alias for -b1
    #[clap(long)]
    pub fast: bool,

    /// Alias for -b9
    #[clap(long)]
    pub best: bool,

    /// Keep (don't delete) input files
    #[clap(short, long)]
    pub keep: bool,

    /// Overwrite existing output files
    #[clap(short, long)]
    pub force: bool,

    /// Write to standard output instead of FILE.bz2
    #[clap(short = 'c', long = "stdout")]
    pub stdout: bool,

    /// Verbosity; repeat for more detail (-v, -vv, -vvv)
    #[clap(short, parse(from_occurrences))]
    pub verbose: usize,

    /// Huffman table refinement passes per block
    #[clap(short = 'i', long, default_value_t = 4)]
    pub iterations: usize,

    /// Block sort work units per byte before a block is randomised
    #[clap(long, default_value_t = 30)]
    pub work_factor: i32,
}

impl Args {
    /// The block size to use for an input of `input_len` bytes, from the
    /// explicit flag, the aliases, or the size of the input.
    pub fn block_size_for(&self, input_len: Option<u64>) -> usize {
        if let Some(size) = self.block_size {
            size
        } else if self.fast {
            1
        } else if self.best {
            9
        } else {
            match input_len {
                Some(len) => crate::compression::compress::choose_block_size(len),
                None => 9,
            }
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_parse() {
        let args = Args::parse_from(["bz", "-kf", "-b3", "-vv", "a.txt", "b.txt"]);
        assert!(args.keep);
        assert!(args.force);
        assert_eq!(args.block_size, Some(3));
        assert_eq!(args.log_level(), LevelFilter::Debug);
        assert_eq!(args.files, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn block_size_resolution() {
        let args = Args::parse_from(["bz"]);
        assert_eq!(args.block_size_for(Some(50_000)), 1);
        assert_eq!(args.block_size_for(Some(450_000)), 5);
        assert_eq!(args.block_size_for(None), 9);

        let fast = Args::parse_from(["bz", "--fast"]);
        assert_eq!(fast.block_size_for(Some(5_000_000)), 1);

        let explicit = Args::parse_from(["bz", "--best", "-b2"]);
        assert_eq!(explicit.block_size_for(Some(10)), 2);
    }
}
