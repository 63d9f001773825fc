use clap::Args;

/// Rendering overrides shared by every subcommand. Unset values fall back to
/// the subcommand's chart preset.
#[derive(Args, Debug, Clone, Default)]
pub struct RenderConfig {
  /// Chart width in pixels.
  #[arg(long, global = true, env = "THANOS_PLOT_WIDTH", value_parser = clap::value_parser!(u32).range(200..))]
  pub width: Option<u32>,
  /// Chart height in pixels.
  #[arg(long, global = true, env = "THANOS_PLOT_HEIGHT", value_parser = clap::value_parser!(u32).range(200..))]
  pub height: Option<u32>,
  /// Hide the legend on charts with more series than this.
  #[arg(long, global = true, env = "THANOS_PLOT_LEGEND_LIMIT")]
  pub legend_limit: Option<usize>,
}
