use std::path::Path;

use anyhow::{Context, Result};

use kbpress::anchors::{derive_heading_refs, find_drift, HeadingDrift};
use kbpress::content::post::Post;
use kbpress::markup::surface::Surface;

use crate::HeadingsArgs;

fn describe(drift: &HeadingDrift) -> String {
    let declared = match drift.declared {
        Some(ref heading) => format!("h{} {} ({})", heading.level, heading.text, heading.id),
        None => "nothing".to_string(),
    };
    let rendered = match drift.rendered {
        Some((level, ref text)) => format!("h{} {}", level, text),
        None => "nothing".to_string(),
    };
    format!("#{}: declared {}, body has {}", drift.index, declared, rendered)
}

pub fn headings_cmd(args: HeadingsArgs) -> Result<bool> {
    let file_name = Path::new(&args.file);
    let post = Post::from_file(file_name)
        .with_context(|| format!("Unable to read post {}", file_name.display()))?;
    let surface = Surface::from_markdown(&post.body);

    if !args.check {
        for heading in derive_heading_refs(&surface)? {
            println!("{}", heading.to_header_line());
        }
        return Ok(true);
    }

    let drift = find_drift(&surface, &post.headings);
    if drift.is_empty() {
        println!("{}: {} headings match", post.id, post.headings.len());
        return Ok(true);
    }

    println!("{}: heading list does not match the body", post.id);
    for entry in drift.iter() {
        println!("  {}", describe(entry));
    }
    Ok(false)
}
