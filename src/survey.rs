use crate::{
    config::Config,
    form::session::FormSession,
    master::table::MasterTable,
    remark::policy::RemarkPolicy,
    sink::{
        csv_file::CsvRecordStore, image_folder::LocalImageStore, ImageStore, RecordStore,
        SubmissionSink,
    },
};

/// Long-lived handles shared by every form: the master table, the remark
/// policy and the sink. Built once at startup and lent to sessions.
pub struct Survey<R = CsvRecordStore, I = LocalImageStore> {
    master: MasterTable,
    policy: RemarkPolicy,
    sink: SubmissionSink<R, I>,
}

impl Survey {
    /// Loads the master table and opens the local CSV ledger and image
    /// folder named by `config`.
    pub fn init(config: &Config) -> anyhow::Result<Survey> {
        let policy = config.policy()?;
        let master = MasterTable::load(&config.master_table)?;
        let images = LocalImageStore::new(&config.image_folder)?;
        let records = CsvRecordStore::new(&config.output_file);
        let sink = SubmissionSink::new(records, images).with_follow_up(config.include_follow_up);
        log::info!(
            "survey ready: {} remarks, ledger {}, images in {}",
            policy.names().len(),
            config.output_file.display(),
            config.image_folder.display()
        );
        Ok(Survey::new(master, policy, sink))
    }
}

impl<R: RecordStore, I: ImageStore> Survey<R, I> {
    pub fn new(master: MasterTable, policy: RemarkPolicy, sink: SubmissionSink<R, I>) -> Survey<R, I> {
        Survey {
            master,
            policy,
            sink,
        }
    }

    pub fn session(&self) -> FormSession<'_> {
        FormSession::new(&self.master, &self.policy)
    }

    pub fn master(&self) -> &MasterTable {
        &self.master
    }

    pub fn policy(&self) -> &RemarkPolicy {
        &self.policy
    }

    pub fn sink(&self) -> &SubmissionSink<R, I> {
        &self.sink
    }
}
