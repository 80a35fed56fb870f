#[cfg(test)]
pub const CONFIG_DATA: &str = r##"
[site]
title = "Directory Notes"
page_language = "en"

[paths]
template_dir = "res/template"
public_dir = "res/public"
posts_dir = "res/posts"

[defaults]
anchor_strategy = "positional"
rendering_cache_enabled = true

[server]
address = "0.0.0.0"
port = 8001

[comments]
backend = "memory"

[translate]
target_language = "ta"

[[categories]]
id = "activedirectory"
title = "Active Directory"
posts = ["ad-dsrm", "ad-schema"]

[[categories]]
id = "entra"
title = "Entra ID"
posts = ["eam"]
"##;

#[cfg(test)]
pub const POST_EAM: &str = r##"<!--
[ID]: # (eam)
[TITLE]: # (Enterprise Access Model (EAM))
[CATEGORY]: # (entra)
[HEADING]: # (2 legacy-tiering-model Legacy Tiering Model)
[HEADING]: # (2 enterprise-access-model-eam Enterprise Access Model (EAM))
[HEADING]: # (2 key-differences-and-evolution Key Differences and Evolution)
-->

# Enterprise Access Model (EAM)

_Published: Aug 16, 2025_

The legacy tiering model and the Enterprise Access Model (EAM) are both frameworks for securing IT infrastructure.

## Legacy Tiering Model

- **Tier 0:** administrative accounts and systems with control over enterprise identities.
- **Tier 1:** administrative accounts that control enterprise servers and applications.
- **Tier 2:** administrative accounts that manage end users, workstations, and devices.

## Enterprise Access Model (EAM)

1. **Control Plane:** expands on Tier 0.
2. **Management Plane:** splits from the old Tier 1.
3. **User Access:** splits from the old Tier 2.

## Key Differences and Evolution

| Legacy | EAM |
|---|---|
| Tiers | Levels of security |
"##;

#[cfg(test)]
pub const POST_NO_HEADER: &str = r##"# PowerShell Introduction

PowerShell is a task automation shell built on .NET.

## Getting help

```powershell
Get-Help Get-ADUser -Examples
```

Run `Update-Help` once per machine.
"##;

#[cfg(test)]
pub const MARKDOWN_ALL_BLOCKS: &str = r##"# Active Directory Recovery

Intro with *emphasis*, **strong**, ~~old~~ and `inline code`.
A hard break follows
next line.

## Checks

- [x] dcdiag
- [ ] repadmin

3. Boot into DSRM
4. Restore system state

> Run every command as a domain admin.

| Tool | Purpose |
|------|---------|
| [dcdiag](https://learn.microsoft.com/dcdiag) | Health |
| ![logo](/public/logo.png "Logo") | Image |

```language-powershell
repadmin /replsummary
```

```
plain text block
```

---

<!-- author note -->

<div>raw html</div>
"##;
