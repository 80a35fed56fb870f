use serde::Deserialize;

/// Presentation classes per render node kind. Every field can be overridden
/// from the `[styles]` section of the configuration.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct StyleMap {
    pub h1: String,
    pub h2: String,
    pub h3: String,
    pub h4: String,
    pub h5: String,
    pub h6: String,
    pub paragraph: String,
    pub unordered_list: String,
    pub ordered_list: String,
    pub list_item: String,
    pub blockquote: String,
    pub link: String,
    pub image: String,
    pub table_wrapper: String,
    pub table: String,
    pub table_header_cell: String,
    pub table_cell: String,
    pub inline_code: String,
    pub plain_code_block: String,
    pub code_block_wrapper: String,
    pub copy_button: String,
    pub horizontal_rule: String,
}

impl StyleMap {
    pub fn heading(&self, level: u8) -> &str {
        match level {
            1 => &self.h1,
            2 => &self.h2,
            3 => &self.h3,
            4 => &self.h4,
            5 => &self.h5,
            _ => &self.h6,
        }
    }
}

impl Default for StyleMap {
    fn default() -> Self {
        StyleMap {
            h1: "text-4xl font-bold text-foreground mb-6 mt-8 first:mt-0".to_string(),
            h2: "text-3xl font-semibold text-foreground mb-4 mt-8 border-b border-border pb-2".to_string(),
            h3: "text-2xl font-semibold text-foreground mb-3 mt-6".to_string(),
            h4: "text-xl font-semibold text-foreground mb-2 mt-4".to_string(),
            h5: String::new(),
            h6: String::new(),
            paragraph: "text-foreground leading-7 mb-4".to_string(),
            unordered_list: "text-foreground space-y-2 mb-4 ml-6 list-disc".to_string(),
            ordered_list: "text-foreground space-y-2 mb-4 ml-6 list-decimal".to_string(),
            list_item: "text-foreground".to_string(),
            blockquote: "border-l-4 border-primary pl-4 italic text-muted-foreground my-4".to_string(),
            link: "text-primary hover:text-primary/80 underline transition-colors".to_string(),
            image: String::new(),
            table_wrapper: "overflow-x-auto my-6".to_string(),
            table: "w-full border-collapse border border-border".to_string(),
            table_header_cell: "border border-border bg-muted px-4 py-2 text-left font-semibold".to_string(),
            table_cell: "border border-border px-4 py-2".to_string(),
            inline_code: "bg-muted px-1.5 py-0.5 rounded text-sm font-mono".to_string(),
            plain_code_block: "bg-muted px-1.5 py-0.5 rounded text-sm font-mono".to_string(),
            code_block_wrapper: "relative group".to_string(),
            copy_button: "absolute right-2 top-2 rounded bg-muted p-1 text-muted-foreground hover:text-foreground opacity-0 group-hover:opacity-100 transition-opacity".to_string(),
            horizontal_rule: String::new(),
        }
    }
}
