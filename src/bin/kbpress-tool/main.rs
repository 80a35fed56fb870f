use std::process::ExitCode;

use clap::Parser;

use crate::headings::headings_cmd;
use crate::post::post_cmd;

mod headings;
mod post;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
enum Args {
    /// Creates a new post file with its header
    Post(PostArgs),
    /// Prints the heading list of a post, or checks it against the body
    Headings(HeadingsArgs),
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct PostArgs {
    /// Title of the post
    #[arg(short, long)]
    title: String,

    /// Category id, also the sub-directory of the post
    #[arg(short, long)]
    category: String,

    /// Posts directory. Writes to stdout when absent
    #[arg(short, long)]
    posts_dir: Option<String>,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct HeadingsArgs {
    /// Post file
    file: String,

    /// Compares the declared headings with the body and fails on mismatch
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let res = match args {
        Args::Post(args) => post_cmd(args),
        Args::Headings(args) => headings_cmd(args),
    };

    match res {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
