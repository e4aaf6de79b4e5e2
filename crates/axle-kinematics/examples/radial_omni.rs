use axle_kinematics::*;
use nalgebra::Vector2;

fn main() -> Result<(), KinematicsError> {
    let layout = RadialLayout::new(3, 0.2).with_axis_rotation(30.0);
    let mut radial = RadialOmnidirectionalRobot::new(layout)?;
    let robot_angular_velocity = 2.0; // rad/s

    radial.robot_mut().set_pose(Vector2::new(1.0, 1.0), 45.0);
    radial
        .robot_mut()
        .set_wheel_velocities(&[robot_angular_velocity; 3])?;

    let robot = radial.robot();
    println!(
        "{} wheels on a {} m circle, robot at ({:.2}, {:.2}) facing {:.1} deg",
        robot.num_wheels(),
        radial.radius(),
        robot.position().x,
        robot.position().y,
        robot.orientation()
    );

    let positions = robot.wheel_positions();
    let velocities = robot.wheel_velocities();
    for (i, (wheel, (position, velocity))) in robot
        .wheels()
        .iter()
        .zip(positions.iter().zip(&velocities))
        .enumerate()
    {
        let relative = position - robot.position();
        let omega = omega_from_v_r(velocity, &relative)?;
        println!(
            "Wheel {}: heading {:>6.1} deg, position ({:.3}, {:.3}), velocity ({:.3}, {:.3}), ω check {:.3} rad/s",
            i,
            wheel.world_orientation(robot.orientation()),
            position.x,
            position.y,
            velocity.x,
            velocity.y,
            omega
        );
    }

    Ok(())
}
