use anyhow::Context;
use axle_kinematics::affine::translation_of;
use axle_kinematics::{
    AckermannCar, KinematicChain, Link, Pose, RadialOmnidirectionalRobot, UnicycleRobot, WheelSpeeds,
    omega_from_v_r,
};
use nalgebra::{Vector2, Vector3};
use tracing::{debug, info, info_span};

use crate::settings::{
    AckermannSettings, ChainSettings, OmniSettings, Settings, SimulationSettings, UnicycleSettings,
};

/// Drives every configured model and logs what it produces.
pub fn run(settings: &Settings) -> anyhow::Result<()> {
    let sim = &settings.simulation;
    info!(dt = sim.dt, steps = sim.steps, "Simulation started.");

    run_unicycle(sim, &settings.unicycle).context("unicycle simulation failed")?;
    run_ackermann(sim, &settings.ackermann).context("ackermann simulation failed")?;
    run_omni(&settings.omni).context("omnidirectional robot failed")?;
    run_chain(&settings.chain).context("link chain failed")?;

    info!("Simulation finished.");
    Ok(())
}

/// Integrates the unicycle under constant motor velocities and returns the final pose.
pub fn run_unicycle(sim: &SimulationSettings, unicycle: &UnicycleSettings) -> anyhow::Result<Pose> {
    let _span = info_span!("unicycle").entered();
    let mut robot = UnicycleRobot::new(unicycle.wheel_distance, unicycle.wheel_diameter)?;

    let speeds = WheelSpeeds::try_from(unicycle.motor_velocities.as_slice())?;
    info!(%robot, %speeds, chassis = %robot.forward_kinematics(speeds), "Unicycle ready.");

    for step in 1..=sim.steps {
        let pose = robot.update_position(&unicycle.motor_velocities, sim.dt)?;
        debug!(step, %pose);
    }

    let pose = robot.pose();
    info!(%pose, "Unicycle final pose.");
    Ok(pose)
}

/// Drives the car under a constant command and returns it in its final state.
pub fn run_ackermann(sim: &SimulationSettings, ackermann: &AckermannSettings) -> anyhow::Result<AckermannCar> {
    let _span = info_span!("ackermann").entered();
    let mut car = AckermannCar::new(
        ackermann.wheelbase,
        ackermann.width,
        ackermann.length,
        ackermann.degrees,
    )?;

    for step in 1..=sim.steps {
        car.update(ackermann.velocity, ackermann.steering_angle, sim.dt)?;
        debug!(step, pose = %car.pose(), heading = car.heading());
    }

    let front = car.front_axle();
    let body = car.body_velocity();
    info!(
        %car,
        heading = car.heading(),
        front_x = front.x,
        front_y = front.y,
        body_vx = body.x,
        body_vy = body.y,
        body_yaw_rate = body.z,
        "Ackermann final state."
    );

    if let Some(arm) = &ackermann.appendage {
        let (base, tip) = (arm.base(&car), arm.tip(&car));
        info!(base_x = base.x, base_y = base.y, tip_x = tip.x, tip_y = tip.y, "Appendage position.");
    }
    Ok(car)
}

/// Spins the radial robot and returns the angular velocity recovered from each wheel.
pub fn run_omni(omni: &OmniSettings) -> anyhow::Result<Vec<f64>> {
    let _span = info_span!("omni").entered();
    let mut radial = RadialOmnidirectionalRobot::new(omni.layout)?;

    let robot = radial.robot_mut();
    robot.set_pose(Vector2::from(omni.position), omni.orientation);
    robot.set_wheel_velocities(&vec![omni.angular_velocity; robot.wheels().len()])?;

    let robot = radial.robot();
    let center = robot.position();
    let mut recovered = Vec::with_capacity(robot.wheels().len());
    for (index, (position, velocity)) in robot
        .wheel_positions()
        .iter()
        .zip(robot.wheel_velocities())
        .enumerate()
    {
        let omega = omega_from_v_r(&velocity, &(position - center))?;
        info!(
            index,
            x = position.x,
            y = position.y,
            vx = velocity.x,
            vy = velocity.y,
            omega,
            "Omni wheel."
        );
        recovered.push(omega);
    }
    Ok(recovered)
}

/// Builds the chain and returns the end-effector position for each configured pose.
pub fn run_chain(chain: &ChainSettings) -> anyhow::Result<Vec<Vector3<f64>>> {
    let _span = info_span!("chain").entered();
    let mut links: KinematicChain = chain
        .links
        .iter()
        .map(|link| {
            Link::new(
                &link.axis,
                &link.offset,
                link.rotation.as_ref(),
                link.state,
                chain.degrees,
            )
        })
        .collect::<Result<_, _>>()?;

    let start = translation_of(&links.end_effector());
    info!(links = links.len(), x = start.x, y = start.y, z = start.z, "Chain built.");

    let mut positions = Vec::with_capacity(chain.poses.len());
    for (index, states) in chain.poses.iter().enumerate() {
        links
            .set_states(states)
            .with_context(|| format!("pose {index} has {} states", states.len()))?;
        let end = translation_of(&links.end_effector());
        info!(pose = index, ?states, x = end.x, y = end.y, z = end.z, "End effector.");
        positions.push(end);
    }
    Ok(positions)
}
