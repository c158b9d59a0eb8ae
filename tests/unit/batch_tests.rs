/*!
 * Tests for the batch executor
 */

use pagetrans::document::{Document, TextUnit};
use pagetrans::providers::mock::MockTranslatorFactory;
use pagetrans::providers::{Translator, TranslatorFactory, TranslatorOptions};
use pagetrans::scanner::DocumentScanner;
use pagetrans::translation::progress::{self, ProgressEvent, ProgressReceiver, ProgressSender};
use pagetrans::translation::{ActiveTranslatedSet, BatchTranslator, PassSummary, TranslationCache};

use crate::common;

fn units_of(document: &Document) -> Vec<TextUnit> {
    DocumentScanner::new(document.body().unwrap()).units().collect()
}

async fn translator_from(factory: &MockTranslatorFactory) -> Box<dyn Translator> {
    factory
        .create(TranslatorOptions {
            source_language: "de".to_string(),
            target_language: "en".to_string(),
            progress: None,
        })
        .await
        .expect("mock translator should be created")
}

fn drain_events(receiver: &mut ProgressReceiver) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

struct Fixture {
    cache: TranslationCache,
    active: ActiveTranslatedSet,
    sender: ProgressSender,
    receiver: ProgressReceiver,
}

impl Fixture {
    fn new() -> Self {
        let (sender, receiver) = progress::channel();
        Self {
            cache: TranslationCache::new(),
            active: ActiveTranslatedSet::new(),
            sender,
            receiver,
        }
    }

    async fn run(&self, document: &Document, translator: &dyn Translator, batch_size: usize, force: bool) -> PassSummary {
        BatchTranslator::new(&self.cache, &self.active, batch_size)
            .translate_units(units_of(document), translator, "en", force, &self.sender)
            .await
    }
}

#[tokio::test]
async fn test_translate_units_withSmallBatches_shouldReportEveryBatchBoundary() {
    let document = Document::parse(&common::paragraphs_page(None, &["Eins", "Zwei", "Drei", "Vier", "Fünf"]));
    let factory = MockTranslatorFactory::working();
    let translator = translator_from(&factory).await;
    let mut fixture = Fixture::new();

    let summary = fixture.run(&document, translator.as_ref(), 2, false).await;

    assert_eq!(summary.translated, 5);
    assert_eq!(summary.total(), 5);
    assert_eq!(
        drain_events(&mut fixture.receiver),
        vec![
            ProgressEvent::Batch { processed: 2, total: 5 },
            ProgressEvent::Batch { processed: 4, total: 5 },
            ProgressEvent::Batch { processed: 5, total: 5 },
        ]
    );
    assert_eq!(
        common::visible_texts(&document),
        vec!["[en] Eins", "[en] Zwei", "[en] Drei", "[en] Vier", "[en] Fünf"]
    );
    assert_eq!(fixture.active.len(), 5);
}

#[tokio::test]
async fn test_translate_units_withSurroundingWhitespace_shouldTranslateCoreOnly() {
    let document = Document::parse(&common::page(None, "<p>\n    Guten Tag  </p>"));
    let factory = common::greeting_translator();
    let translator = translator_from(&factory).await;
    let fixture = Fixture::new();

    fixture.run(&document, translator.as_ref(), 20, false).await;

    assert_eq!(factory.requests(), vec!["Guten Tag".to_string()]);
    let unit = &units_of(&document)[0];
    assert_eq!(unit.text(), "\n    Good day  ");
    let record = fixture.cache.record_for(unit).unwrap();
    assert_eq!(record.original_text(), "\n    Guten Tag  ");
    assert_eq!(record.translation("en"), Some("\n    Good day  "));
}

#[tokio::test]
async fn test_translate_units_withOneFailingUnit_shouldLeaveItUntouched() {
    let document = Document::parse(&common::paragraphs_page(None, &["Eins", "Zwei", "Drei"]));
    let factory = MockTranslatorFactory::working().fail_on("Zwei");
    let translator = translator_from(&factory).await;
    let fixture = Fixture::new();

    let summary = fixture.run(&document, translator.as_ref(), 20, false).await;

    assert_eq!(summary.translated, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(common::visible_texts(&document), vec!["[en] Eins", "Zwei", "[en] Drei"]);

    let failed = &units_of(&document)[1];
    assert!(fixture.cache.record_for(failed).is_none());
    assert!(!fixture.active.contains(failed));
    assert_eq!(fixture.active.len(), 2);
}

#[tokio::test]
async fn test_translate_units_withCachedTranslation_shouldNotCallTranslator() {
    let document = Document::parse(&common::paragraphs_page(None, &["Eins", "Zwei"]));
    let factory = MockTranslatorFactory::working();
    let translator = translator_from(&factory).await;
    let fixture = Fixture::new();

    fixture.run(&document, translator.as_ref(), 20, false).await;
    assert_eq!(factory.call_count(), 2);

    // Put the original text back, as undo would
    for unit in units_of(&document) {
        let original = fixture.cache.original_text(&unit).unwrap();
        unit.set_text(&original);
    }

    let summary = fixture.run(&document, translator.as_ref(), 20, false).await;

    assert_eq!(summary, PassSummary { translated: 0, cached: 2, failed: 0, vanished: 0 });
    assert_eq!(factory.call_count(), 2);
    assert_eq!(common::visible_texts(&document), vec!["[en] Eins", "[en] Zwei"]);
}

#[tokio::test]
async fn test_translate_units_withForce_shouldBypassCacheAndKeepBaseline() {
    let document = Document::parse(&common::paragraphs_page(None, &["Eins"]));
    let first = MockTranslatorFactory::working();
    let second = MockTranslatorFactory::with_dictionary([("Eins", "One")]);
    let fixture = Fixture::new();

    fixture.run(&document, translator_from(&first).await.as_ref(), 20, false).await;
    assert_eq!(common::visible_texts(&document), vec!["[en] Eins"]);

    let summary = fixture.run(&document, translator_from(&second).await.as_ref(), 20, true).await;

    assert_eq!(summary.translated, 1);
    // The forced call translates the original, not our earlier translation
    assert_eq!(second.requests(), vec!["Eins".to_string()]);
    let unit = &units_of(&document)[0];
    assert_eq!(unit.text(), "One");
    let record = fixture.cache.record_for(unit).unwrap();
    assert_eq!(record.original_text(), "Eins");
    assert_eq!(record.translation("en"), Some("One"));
}

#[tokio::test]
async fn test_translate_units_withTextRewrittenByPage_shouldStartFreshRecord() {
    let document = Document::parse(&common::page(None, "<p id=\"live\">Eins</p>"));
    let factory = MockTranslatorFactory::working();
    let translator = translator_from(&factory).await;
    let fixture = Fixture::new();

    fixture.run(&document, translator.as_ref(), 20, false).await;

    let live = common::find_element_by_id(&document.root(), "p", "live").unwrap();
    common::rewrite_text(&live, "Neuer Text");

    fixture.run(&document, translator.as_ref(), 20, false).await;

    let unit = &units_of(&document)[0];
    assert_eq!(unit.text(), "[en] Neuer Text");
    let record = fixture.cache.record_for(unit).unwrap();
    assert_eq!(record.original_text(), "Neuer Text");
    assert_eq!(record.translation_count(), 1);
}

#[tokio::test]
async fn test_translate_units_withFailureOnRewrittenText_shouldKeepOldRecord() {
    let document = Document::parse(&common::page(None, "<p id=\"live\">Eins</p>"));
    let working = MockTranslatorFactory::working();
    let failing = MockTranslatorFactory::failing();
    let fixture = Fixture::new();

    fixture.run(&document, translator_from(&working).await.as_ref(), 20, false).await;

    let live = common::find_element_by_id(&document.root(), "p", "live").unwrap();
    common::rewrite_text(&live, "Neuer Text");

    let summary = fixture.run(&document, translator_from(&failing).await.as_ref(), 20, false).await;

    assert_eq!(summary.failed, 1);
    let unit = &units_of(&document)[0];
    assert_eq!(unit.text(), "Neuer Text");
    assert_eq!(fixture.cache.original_text(unit).as_deref(), Some("Eins"));
}

#[tokio::test]
async fn test_translate_units_withNoUnits_shouldReturnEmptySummary() {
    let document = Document::parse(&common::page(None, "<script>var a;</script>"));
    let factory = MockTranslatorFactory::working();
    let translator = translator_from(&factory).await;
    let mut fixture = Fixture::new();

    let summary = fixture.run(&document, translator.as_ref(), 20, false).await;

    assert_eq!(summary, PassSummary::default());
    assert!(drain_events(&mut fixture.receiver).is_empty());
    assert_eq!(factory.call_count(), 0);
}
