use std::fmt::Write;
use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{bail, Result};

use kbpress::anchors::slugify;

use crate::PostArgs;

fn render_header(id: &str, title: &str, category: &str) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "<!--");
    let _ = writeln!(&mut buf, "[ID]: # ({})", id);
    let _ = writeln!(&mut buf, "[TITLE]: # ({})", title);
    let _ = writeln!(&mut buf, "[CATEGORY]: # ({})", category);
    let _ = writeln!(&mut buf, "[HEADING]: # (2 overview Overview)");
    let _ = writeln!(&mut buf, "-->");
    let _ = writeln!(&mut buf);
    buf
}

fn render_body(title: &str) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "# {}", title);
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "## Overview");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "Replace with your content. Keep one HEADING line per heading, in order.");
    buf
}

fn post_id_from_title(category: &str, title: &str) -> String {
    let title = slugify(title);
    let category = slugify(category);
    if title.starts_with(&category) {
        title
    } else {
        format!("{}-{}", category, title)
    }
}

pub fn post_cmd(args: PostArgs) -> Result<bool> {
    let id = post_id_from_title(&args.category, &args.title);
    let content = render_header(&id, &args.title, &args.category) + &render_body(&args.title);

    let Some(posts_dir) = args.posts_dir else {
        print!("{}", content);
        return Ok(true);
    };

    let dir = PathBuf::from(posts_dir).join(&args.category);
    let file_name = dir.join(format!("{}.md", id));
    if file_name.exists() {
        bail!("Post {} already exists", file_name.display());
    }

    fs::create_dir_all(&dir)?;
    println!("Creating file {}", file_name.display());
    let mut file = File::create(&file_name)?;
    std::io::Write::write_all(&mut file, content.as_bytes())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use kbpress::content::post::Post;

    use super::*;

    #[test]
    fn test_post_id() {
        assert_eq!(post_id_from_title("entra", "Entra ID Overview"), "entra-id-overview");
        assert_eq!(post_id_from_title("activedirectory", "DSRM Password"), "activedirectory-dsrm-password");
        assert_eq!(post_id_from_title("ai", "Ção é IA"), "ai-cao-e-ia");
    }

    #[test]
    fn test_scaffold_is_a_valid_post() {
        let content = render_header("entra-id", "Entra ID", "entra") + &render_body("Entra ID");
        let post = Post::from_string(Path::new("posts/entra/entra-id.md"), &content).unwrap();
        assert_eq!(post.id.0, "entra-id");
        assert_eq!(post.title, "Entra ID");
        assert_eq!(post.headings.len(), 1);
        assert_eq!(post.body, "\n# Entra ID\n\n## Overview\n\nReplace with your content. Keep one HEADING line per heading, in order.\n");
    }
}
