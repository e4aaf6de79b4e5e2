use axle_kinematics::*;

fn main() {
    let wheel_distance = 0.5;
    let wheel_diameter = 0.2;
    let robot_result = UnicycleRobot::new(wheel_distance, wheel_diameter);

    let chassis_speeds = ChassisSpeeds::new(1.0, 0.0); // 1.0 m/s forward, 0 rad/s turning
    let dt = 0.1; // Time step in seconds
    let num_steps = 10;

    match robot_result {
        Ok(mut robot) => {
            let wheel_speeds = robot.inverse_kinematics(chassis_speeds);
            let motor_velocities = [wheel_speeds.omega_l, wheel_speeds.omega_r];

            println!("Initializing simulation...");
            println!("  Unicycle Parameters:");
            println!("    Wheel Distance: {} m", robot.wheel_distance());
            println!("    Wheel Diameter: {} m", robot.wheel_diameter());
            println!("  Initial State:");
            println!("    Pose:           {}", robot.pose());
            println!("    Chassis Speeds: {}", chassis_speeds);
            println!("    Wheel Speeds:   {}", wheel_speeds);
            println!("  Simulation Settings:");
            println!("    Time Step:    {} s", dt);
            println!("    Num Steps:    {}", num_steps);
            println!("\nSimulating...");

            for i in 0..num_steps {
                match robot.update_position(&motor_velocities, dt) {
                    Ok(pose) => println!("Step {:>2}: Pose: {}", i + 1, pose),
                    Err(e) => {
                        eprintln!("Error during simulation step {}: {}", i + 1, e);
                        break;
                    }
                }
            }

            println!("\nSimulation complete.");
            println!("Final Pose: {:?}", robot.pose());
        }
        Err(e) => {
            eprintln!("Failed to initialize robot: {}", e);
            eprintln!(
                "Please ensure wheel_distance ({}) and wheel_diameter ({}) are positive.",
                wheel_distance, wheel_diameter
            );
        }
    }
}
