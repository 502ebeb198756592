/// Shape of the files written before they are all deleted at once. The default is 25 batches of
/// 16 files plus the directory that holds them, 401 strays in all.
///
/// Batch `i` holds one file per size step, named `{i}_{step}MB.bin` and sized `step * step_bytes`.
/// Everything lives in a single directory so one recursive delete turns it all into strays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadShape {
    pub dir_name: String,
    pub batches: u64,
    pub size_steps: u64,
    pub step_bytes: u64,
}

impl Default for WorkloadShape {
    fn default() -> Self {
        Self {
            dir_name: "delete_me".to_string(),
            batches: 25,
            size_steps: 16,
            step_bytes: 1024 * 1024,
        }
    }
}

impl WorkloadShape {
    /// Every file plus the directory. This is the number of strays a full purge must report.
    pub fn total_objects(&self) -> u64 {
        self.batches * self.size_steps + 1
    }

    /// File names and sizes in creation order.
    pub fn files(&self) -> impl Iterator<Item = (String, u64)> + '_ {
        (0..self.batches).flat_map(move |i| {
            (0..self.size_steps).map(move |step| (format!("{i}_{step}MB.bin"), step * self.step_bytes))
        })
    }
}

/// Creates and deletes the workload on the filesystem under test.
#[allow(async_fn_in_trait)]
pub trait WorkloadDriver {
    async fn create_workload(&self, shape: &WorkloadShape) -> anyhow::Result<()>;

    /// Recursively delete the workload directory, turning every object in it into a stray.
    async fn remove_workload(&self, shape: &WorkloadShape) -> anyhow::Result<()>;
}
