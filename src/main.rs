use anyhow::Result;

use sunlit::problem::SolarProblem;
use sunlit::settings;

fn main() -> Result<()> {
    let settings = settings::load_config()?;
    let mut problem = SolarProblem::new(settings)?;

    problem.solve()?;
    problem.writeup();

    Ok(())
}
