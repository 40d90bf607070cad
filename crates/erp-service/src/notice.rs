//! Notice board.

use erp_core::{
  Result,
  notice::{Notice, NoticeForm},
  store::CampusStore,
};

use crate::{Campus, store_error, token::Claims};

impl<S: CampusStore> Campus<S> {
  pub async fn create_notice(&self, form: NoticeForm) -> Result<Notice> {
    let input = form.validate()?;
    let notice = self.store.add_notice(input).await.map_err(store_error)?;
    tracing::info!(topic = %notice.topic, audience = %notice.notice_for, "notice published");
    Ok(notice)
  }

  /// Notices addressed to the caller's role, newest first.
  pub async fn notices(&self, claims: &Claims) -> Result<Vec<Notice>> {
    let mut notices = self.store.list_notices().await.map_err(store_error)?;
    notices.retain(|n| n.notice_for.reaches(claims.role));
    Ok(notices)
  }
}
