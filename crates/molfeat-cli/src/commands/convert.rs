use crate::cli::ConvertArgs;
use crate::error::Result;
use molfeat::workflows;
use tracing::info;

pub fn run(args: ConvertArgs) -> Result<()> {
    info!("Loading features from {:?}", &args.input);
    let features = workflows::load_features(&args.input)?;

    let rows: Vec<_> = features.rows().into_iter().map(|row| row.to_owned()).collect();
    workflows::save_features(&args.output, &rows)?;

    let written = workflows::npz_path(&args.output);
    println!(
        "Wrote {} x {} features to {}",
        features.nrows(),
        features.ncols(),
        written.display()
    );
    Ok(())
}
