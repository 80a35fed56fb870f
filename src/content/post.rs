use std::fmt::{self, Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize)]
pub struct PostId(pub String);

impl Display for PostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anchor declared by the author for one heading of the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingRef {
    pub id: String,
    pub text: String,
    pub level: u8,
}

impl HeadingRef {
    pub fn new(id: &str, text: &str, level: u8) -> io::Result<HeadingRef> {
        if !(1..=6).contains(&level) {
            return Err(io::Error::new(ErrorKind::InvalidData, format!("Heading level must be between 1 and 6, got {}", level)));
        }
        if id.is_empty() || id.chars().any(|c| c.is_whitespace() || c == '#') {
            return Err(io::Error::new(ErrorKind::InvalidData, format!("Heading id is not fragment safe: [{}]", id)));
        }

        Ok(HeadingRef {
            id: id.to_string(),
            text: text.to_string(),
            level,
        })
    }

    /// Parses the value of a `[HEADING]: # (<level> <id> <text>)` header line.
    pub fn parse(value: &str) -> io::Result<HeadingRef> {
        let mut parts = value.trim().splitn(3, ' ');
        let level = parts.next().unwrap_or_default();
        let id = parts.next().unwrap_or_default();
        let text = parts.next().unwrap_or_default().trim();

        let level: u8 = level.parse().map_err(|_| {
            io::Error::new(ErrorKind::InvalidData, format!("Invalid heading level in [{}]", value))
        })?;

        Self::new(id, text, level)
    }

    pub fn to_header_line(&self) -> String {
        format!("[HEADING]: # ({} {} {})", self.level, self.id, self.text)
    }
}

pub struct Post {
    pub file_name: PathBuf,
    pub id: PostId,
    pub title: String,
    pub category: String,
    pub body: String,
    pub headings: Vec<HeadingRef>,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id={}, category={}, headings={}\ntitle={}\nbody:\n{}",
               self.id,
               self.category,
               self.headings.len(),
               self.title,
               self.body
        )
    }
}

/// Example of post
/// <!--
/// [ID]: # (eam)
/// [TITLE]: # (Enterprise Access Model (EAM))
/// [CATEGORY]: # (entra)
/// [HEADING]: # (2 legacy-tiering-model Legacy Tiering Model)
/// -->
///
/// # Enterprise Access Model (EAM)
impl Post {
    pub fn from_file(file_name: &Path) -> io::Result<Post> {
        let raw = fs::read_to_string(file_name)?;
        Self::from_string(file_name, &raw)
    }

    pub fn from_string(file_name: &Path, raw: &str) -> io::Result<Post> {
        let mut lines = raw.lines().peekable();

        let mut id = String::new();
        let mut title = String::new();
        let mut category = String::new();
        let mut headings = vec![];

        while lines.next_if(|line| line.trim().is_empty()).is_some() {}
        let start_with_comment = lines.next_if(|line| line.trim() == "<!--").is_some();

        while let Some(&line) = lines.peek() {
            if line.trim().is_empty() {
                lines.next();
                continue;
            }

            let Some((key, val)) = extract_header(line) else {
                break;
            };

            match key {
                "ID" => id = val.to_string(),
                "TITLE" => title = val.to_string(),
                "CATEGORY" => category = val.to_string(),
                "HEADING" => headings.push(HeadingRef::parse(val).map_err(|e| {
                    io::Error::new(e.kind(), format!("{} - file={}", e, file_name.display()))
                })?),
                _ => {}
            }
            lines.next();
        }

        if start_with_comment {
            loop {
                match lines.next() {
                    Some(line) if line.trim() == "-->" => break,
                    Some(_) => continue,
                    None => return Err(io::Error::new(
                        ErrorKind::InvalidData,
                        format!("End of comment in the header is missing - file={}", file_name.display()))),
                }
            }
        }

        let mut body = String::new();
        for line in lines {
            body.push_str(line);
            body.push('\n');
        }

        if id.is_empty() {
            id = file_name.file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, format!("Invalid post path {}", file_name.display())))?;
        }

        if category.is_empty() {
            category = file_name.parent()
                .and_then(|dir| dir.file_name())
                .map(|dir| dir.to_string_lossy().to_string())
                .unwrap_or_default();
        }

        if title.is_empty() {
            title = parse_title_markdown(&body);
        }

        Ok(Post {
            file_name: file_name.to_path_buf(),
            id: PostId(id),
            title,
            category,
            body,
            headings,
        })
    }
}

/// Title taken from the first level 1 heading of the body
pub fn parse_title_markdown(body: &str) -> String {
    body.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .unwrap_or_default()
}

fn extract_header(line: &str) -> Option<(&str, &str)> {
    lazy_static! {
        static ref HEADER_REGEX: Regex = Regex::new(r"^\[(?P<key>\w+)\]: # \((?P<value>.*)\)\s*$").unwrap();
    }

    HEADER_REGEX.captures(line).and_then(|cap| {
        let key = cap.name("key").map(|key| key.as_str());
        let val = cap.name("value").map(|val| val.as_str());
        match (key, val) {
            (Some(key), Some(val)) => Some((key, val)),
            _ => None
        }
    })
}
