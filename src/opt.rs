//! Options parser.

use crate::error::{Error, Result};
use crate::syntax::{Mode, Variant};
use crate::theme::Appearance;
use std::str::FromStr;

#[derive(Debug, Default)]
pub struct Options {
    pub help: bool,
    pub version: bool,
    pub config_path: Option<String>,
    pub bare: bool,
    pub theme: Option<Appearance>,
    pub variant: Option<Variant>,
    pub mode: Option<Mode>,
    pub tag_completion: Option<bool>,
    pub background: Option<bool>,
    pub budget: Option<u64>,
    pub interval: Option<u64>,
    pub spans: bool,
    pub watch: bool,
    pub files: Vec<String>,
}

impl Options {
    pub fn parse<T>(args: T) -> Result<Options>
    where
        T: IntoIterator<Item = String>,
    {
        let mut opts = Options::default();
        let mut it = args.into_iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--help" => opts.help = true,
                "--version" => opts.version = true,
                "--config" => opts.config_path = Some(expect_value(&arg, it.next())?),
                "--bare" => opts.bare = true,
                "--theme" => opts.theme = Some(parse_arg(&arg, it.next())?),
                "--variant" => opts.variant = Some(parse_arg(&arg, it.next())?),
                "--mode" => opts.mode = Some(parse_arg(&arg, it.next())?),
                "--tags" => opts.tag_completion = Some(true),
                "--no-tags" => opts.tag_completion = Some(false),
                "--background" => opts.background = Some(true),
                "--budget" => opts.budget = Some(parse_arg(&arg, it.next())?),
                "--interval" => opts.interval = Some(parse_arg(&arg, it.next())?),
                "--spans" => opts.spans = true,
                "--watch" => opts.watch = true,
                arg if arg.starts_with("--") => return Err(Error::unexpected_arg(arg)),
                _ => opts.files.push(arg),
            }
        }
        Ok(opts)
    }
}

fn parse_arg<T>(arg: &str, next_arg: Option<String>) -> Result<T>
where
    T: FromStr,
{
    if let Some(value) = next_arg {
        value
            .parse::<T>()
            .map_err(|_| Error::invalid_value(arg, &value))
    } else {
        Err(Error::expected_value(arg))
    }
}

fn expect_value(arg: &str, next_arg: Option<String>) -> Result<String> {
    next_arg.ok_or_else(|| Error::expected_value(arg))
}
