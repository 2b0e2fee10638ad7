use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "wireshade",
    author,
    version,
    about = "Renders a full-screen animated shader quad in a window"
)]
pub struct Cli {
    /// Vertex shader source: an http(s) URL, or a path resolved locally
    /// (or against `--base-url` when set).
    #[arg(
        long,
        value_name = "SOURCE",
        default_value = "shaders/vertexShader.glsl"
    )]
    pub vertex: String,

    /// Fragment shader source, resolved the same way as `--vertex`.
    #[arg(
        long,
        value_name = "SOURCE",
        default_value = "shaders/fragmentShader.glsl"
    )]
    pub fragment: String,

    /// Base URL that relative shader sources are fetched from instead of
    /// the local filesystem.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Initial window size (e.g. `1280x720`).
    #[arg(
        long,
        value_name = "WIDTHxHEIGHT",
        value_parser = parse_surface_size,
        default_value = "1280x720"
    )]
    pub size: (u32, u32),

    /// Window title.
    #[arg(long, value_name = "TITLE", default_value = "wireshade")]
    pub title: String,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32), String> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_point_at_bundled_shaders() {
        let cli = Cli::parse_from(["wireshade"]);
        assert_eq!(cli.vertex, "shaders/vertexShader.glsl");
        assert_eq!(cli.fragment, "shaders/fragmentShader.glsl");
        assert_eq!(cli.size, (1280, 720));
        assert_eq!(cli.title, "wireshade");
        assert!(cli.base_url.is_none());
    }

    #[test]
    fn parses_surface_size_variants() {
        assert_eq!(parse_surface_size("1920x1080").unwrap(), (1920, 1080));
        assert_eq!(parse_surface_size(" 640X480 ").unwrap(), (640, 480));
        assert!(parse_surface_size("1920").is_err());
        assert!(parse_surface_size("0x720").is_err());
        assert!(parse_surface_size("widexhigh").is_err());
    }

    #[test]
    fn accepts_remote_sources_and_base_url() {
        let cli = Cli::parse_from([
            "wireshade",
            "--vertex",
            "quad.vert",
            "--fragment",
            "quad.frag",
            "--base-url",
            "https://example.com/shaders/",
            "--size",
            "800x600",
        ]);
        assert_eq!(cli.vertex, "quad.vert");
        assert_eq!(cli.fragment, "quad.frag");
        assert_eq!(cli.base_url.as_deref(), Some("https://example.com/shaders/"));
        assert_eq!(cli.size, (800, 600));
    }
}
