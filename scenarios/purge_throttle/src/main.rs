use anyhow::Context;
use cephfs_tunnel_bindings::prelude::{CephAdminClient, MountWorkload};
use purge_tunnel_runner::prelude::*;

type CephContext = RunnerContext<CephAdminClient, MountWorkload>;

fn connect(cli: &PurgeTunnelCli) -> PurgeTunnelResult<(CephAdminClient, MountWorkload)> {
    if !cli.mount.is_dir() {
        anyhow::bail!("Mount path {} is not a directory", cli.mount.display());
    }

    let mds = CephAdminClient::connect(&cli.mds)
        .with_context(|| format!("Cannot reach the admin socket of {}", cli.mds))?;
    log::info!(
        "Using {} with workload under {}",
        mds.daemon(),
        cli.mount.display()
    );

    Ok((mds, MountWorkload::new(&cli.mount)))
}

fn ops_throttle(ctx: &mut CephContext) -> HookResult {
    execute_throttle_scenario(ctx, ThrottleKind::Ops)
}

fn files_throttle(ctx: &mut CephContext) -> HookResult {
    execute_throttle_scenario(ctx, ThrottleKind::Files)
}

fn main() -> PurgeTunnelResult<()> {
    let builder =
        ScenarioDefinitionBuilder::<CephAdminClient, MountWorkload>::new_with_init(env!(
            "CARGO_PKG_NAME"
        ))
        .use_backend(connect)
        .use_named_test("ops_throttle", ops_throttle)
        .use_named_test("files_throttle", files_throttle);

    run(builder)?;

    Ok(())
}
