use axle_kinematics::{Appendage, Offset, RadialLayout, RotationSpec};
use config::{Config, ConfigError, Environment, File, FileFormat, Source};
use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Everything the simulation binary reads from its configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub unicycle: UnicycleSettings,
    pub ackermann: AckermannSettings,
    pub omni: OmniSettings,
    pub chain: ChainSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSettings {
    /// Integration step (s).
    pub dt: f64,
    pub steps: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnicycleSettings {
    pub wheel_distance: f64,
    pub wheel_diameter: f64,
    /// `[left, right]` wheel angular velocities (rad/s).
    pub motor_velocities: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AckermannSettings {
    pub wheelbase: f64,
    pub width: f64,
    pub length: f64,
    #[serde(default = "default_degrees")]
    pub degrees: bool,
    pub velocity: f64,
    pub steering_angle: f64,
    pub appendage: Option<Appendage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OmniSettings {
    pub layout: RadialLayout,
    /// Robot angular velocity applied to every wheel (rad/s).
    pub angular_velocity: f64,
    #[serde(default)]
    pub position: [f64; 2],
    /// Heading (deg).
    #[serde(default)]
    pub orientation: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainSettings {
    #[serde(default = "default_degrees")]
    pub degrees: bool,
    pub links: Vec<LinkSettings>,
    /// Joint states to visit, one value per link.
    #[serde(default)]
    pub poses: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkSettings {
    /// `x`, `y`, `z` for a rotational link, `tx`, `ty`, `tz` for a translational one.
    pub axis: String,
    #[serde(default)]
    pub offset: Offset,
    pub rotation: Option<RotationSpec>,
    #[serde(default)]
    pub state: f64,
}

fn default_degrees() -> bool {
    true
}

/// Loads settings from the TOML file at `path`, with `AXLE_` environment overrides.
pub fn load_settings(path: &str) -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    match build_settings(File::new(path, FileFormat::Toml).required(true)) {
        Ok(settings) => {
            info!("Successfully loaded configuration: {:?}", settings);
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

fn build_settings<S>(source: S) -> Result<Settings, ConfigError>
where
    S: Source + Send + Sync + 'static,
{
    Config::builder()
        .add_source(source)
        .add_source(
            Environment::with_prefix("AXLE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [simulation]
        dt = 0.05
        steps = 3

        [unicycle]
        wheel_distance = 0.5
        wheel_diameter = 0.2
        motor_velocities = [1.0, 2.0]

        [ackermann]
        wheelbase = 2.0
        width = 1.0
        length = 3.0
        velocity = 1
        steering_angle = 0

        [omni]
        angular_velocity = 1.0

        [omni.layout]
        num_wheels = 4
        radius = 1.0

        [[chain.links]]
        axis = "z"
    "#;

    fn parse(contents: &str) -> Result<Settings, ConfigError> {
        build_settings(File::from_str(contents, FileFormat::Toml))
    }

    #[test]
    fn test_minimal_settings_use_defaults() {
        let settings = parse(MINIMAL).unwrap();

        assert_eq!(settings.simulation.steps, 3);
        assert_eq!(settings.unicycle.motor_velocities, vec![1.0, 2.0]);
        assert!(settings.ackermann.degrees);
        assert_eq!(settings.ackermann.velocity, 1.0);
        assert!(settings.ackermann.appendage.is_none());
        assert_eq!(settings.omni.position, [0.0, 0.0]);
        assert_eq!(settings.omni.layout.wheel_diameter, 0.5);
        assert_eq!(settings.omni.layout.wheel_width(), 0.5);
        assert!(settings.chain.degrees);
        assert!(settings.chain.poses.is_empty());
        assert_eq!(settings.chain.links[0].offset, Offset::Scalar(0.0));
        assert!(settings.chain.links[0].rotation.is_none());
    }

    #[test]
    fn test_geometry_notations() {
        let contents = format!(
            "{MINIMAL}{}",
            r#"
            [[chain.links]]
            axis = "tx"
            offset = [0.0, 0.0, 0.3]
            rotation = [0.0, 90.0, 0.0]

            [[chain.links]]
            axis = "y"
            offset = ["z", 0.4]
            rotation = ["x", 45.0]

            [[chain.links]]
            axis = "x"
            offset = [["tx", 0.1], ["tz", 0.05]]
            rotation = [["y", 90.0], ["z", -30.0]]
            state = 12.5
            "#
        );
        let links = parse(&contents).unwrap().chain.links;

        assert_eq!(links.len(), 4);
        assert_eq!(links[1].offset, Offset::Vector([0.0, 0.0, 0.3]));
        assert_eq!(links[1].rotation, Some(RotationSpec::Euler([0.0, 90.0, 0.0])));
        assert_eq!(links[2].offset, Offset::AxisValue("z".into(), 0.4));
        assert_eq!(links[2].rotation, Some(RotationSpec::AxisAngle("x".into(), 45.0)));
        assert_eq!(
            links[3].offset,
            Offset::AxisValues(vec![("tx".into(), 0.1), ("tz".into(), 0.05)])
        );
        assert_eq!(
            links[3].rotation,
            Some(RotationSpec::AxisAngles(vec![("y".into(), 90.0), ("z".into(), -30.0)]))
        );
        assert_eq!(links[3].state, 12.5);
    }

    #[test]
    fn test_appendage_settings() {
        let contents = format!(
            "{MINIMAL}{}",
            r#"
            [ackermann.appendage]
            offset = [1.0, -0.5]
            length = 2.0
            angle = 30.0
            "#
        );
        let appendage = parse(&contents).unwrap().ackermann.appendage.unwrap();

        assert_eq!(appendage.offset, nalgebra::Vector2::new(1.0, -0.5));
        assert_eq!(appendage.length, 2.0);
        assert_eq!(appendage.angle, 30.0);
    }

    #[test]
    fn test_missing_section_is_an_error() {
        let result = parse("[simulation]\ndt = 0.1\nsteps = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_settings("config/does-not-exist.toml").is_err());
    }
}
