//! Rendered output parses back to the same tree, and rendering it again
//! reproduces the text byte for byte.

use apexgen::parser::parse_statement;
use apexgen::{generate, generate_with_options, parse, GenerateOptions, Generator};
use pretty_assertions::assert_eq;

const SAMPLES: &[&str] = &[
    r#"
    public with sharing class AccountService {
        private static final Integer MAX = 200;
        public String Label { get; private set; }

        public AccountService() {
            this.Label = 'default';
        }

        public List<Account> load(Set<Id> ids) {
            List<Account> rows = [
                SELECT Id, Name, Owner.Name
                FROM Account
                WHERE Id IN :ids AND (Name LIKE 'A%' OR Industry = null)
                ORDER BY Name ASC NULLS LAST
                LIMIT 200
            ];
            for (Account a : rows) {
                if (a.Name == null) {
                    a.Name = 'Unknown';
                } else if (a.Name.length() > MAX) {
                    a.Name = a.Name.substring(0, MAX);
                } else {
                    continue;
                }
            }
            update rows;
            return rows;
        }
    }
    "#,
    r#"
    @IsTest
    private class AccountServiceTest {
        @IsTest
        static void loadsAccounts() {
            Map<String, Integer> counts = new Map<String, Integer>{'a' => 1, 'b' => 2};
            Integer[] sizes = new Integer[3];
            Integer total = 0;
            for (Integer i = 0; i < sizes.size(); i++) {
                total += i * 2 - (i / 3);
            }
            do {
                total--;
            } while (total > 0 && !counts.isEmpty());
            System.assertEquals(0, total);
        }
    }
    "#,
    r#"
    public interface Repository extends Queryable {
        List<SObject> fetch(String objectName);
        void save(SObject record);
    }

    public enum Status { OPEN, CLOSED }
    "#,
    r#"
    trigger ContactTrigger on Contact (before insert, before update, after delete) {
        switch on context.operationType {
            when BEFORE_INSERT, BEFORE_UPDATE {
                ContactHandler.validate(records);
            }
            when else {
                ContactHandler.cleanup(records);
            }
        }
        try {
            insert new Task(Subject = 'Follow up');
        } catch (DmlException e) {
            throw new HandlerException(e.getMessage());
        } finally {
            ContactHandler.flush();
        }
    }
    "#,
    r#"
    public class SearchController {
        public Object search(String term) {
            Object hits = [FIND 'Acme' IN NAME FIELDS RETURNING Account(Id, Name), Contact LIMIT 20];
            Boolean matched = hits instanceof List<List<SObject>> ? true : false;
            Account first = (Account)((List<SObject>)hits)[0];
            return matched ? first : null;
        }
    }
    "#,
    r#"
    public class LiteralEdges {
        public static final Long MAX_BYTES = 3000000000L;
        private Double ratio = 1e3;

        public Integer flip(Integer x) {
            Integer a = - -x;
            Integer b = + +x;
            Integer c = - --x;
            Integer d = -(-x);
            return a + b - -c * d;
        }

        public String text() {
            return 'tab\there\fform\bback café it\'s \\ done\n';
        }

        public List<Lead> open(Set<Id> ids, Integer page) {
            return [
                SELECT Id, Status
                FROM Lead
                WHERE NOT (Status = 'Closed' OR Rating IN ('Cold', 'Dead'))
                    AND Id NOT IN :ids
                    AND Tags__c INCLUDES ('a', 'b')
                    AND NOT Amount > 1.5
                ORDER BY CreatedDate DESC
                LIMIT 50
                OFFSET :page
            ];
        }
    }
    "#,
    r#"
    @IsTest
    public with sharing class InvoiceLedger {
        private static final String FALLBACK = 'n/a';
        public List<Invoice__c> invoices { get; private set; }

        public InvoiceLedger() {
            this(new List<Invoice__c>());
        }

        public InvoiceLedger(List<Invoice__c> seed) {
            this.invoices = seed;
        }

        public void record(Invoice__c row) {
            if (row != null) {
                invoices.add(row);
            }
        }

        public List<Invoice__c> unpaid() {
            List<Invoice__c> pending = new List<Invoice__c>();
            for (Invoice__c row : invoices) {
                if (!row.Paid__c) {
                    pending.add(row);
                }
            }
            return pending;
        }

        public static void persist(List<Invoice__c> rows) {
            try {
                upsert rows;
            } catch (DmlException e) {
                System.debug('Failed: ' + e.getMessage());
            }
        }

        public class Line {
            public Decimal amount { get; set; }
            public Boolean taxed { get; set; }
        }

        public enum Stage { DRAFT, SENT, PAID, VOID_STAGE }
    }
    "#,
    r#"
    @IsTest
    private class InvoiceLedgerTest {
        @TestSetup
        static void seed() {
            List<Invoice__c> rows = new List<Invoice__c>();
            for (Integer i = 0; i < 5; i++) {
                rows.add(new Invoice__c(Name = 'INV-' + i));
            }
            insert rows;
        }

        @IsTest
        static void recordsOneInvoice() {
            InvoiceLedger ledger = new InvoiceLedger();
            Test.startTest();
            ledger.record(new Invoice__c(Name = 'single'));
            Test.stopTest();
            System.assertEquals(1, ledger.invoices.size());
        }

        @IsTest
        static void loadsFromQuery() {
            InvoiceLedger ledger = new InvoiceLedger([SELECT Id, Paid__c FROM Invoice__c]);
            System.assertNotEquals(null, ledger.unpaid());
        }
    }
    "#,
    r#"
    global class InvoiceSweep implements Database.Batchable<SObject>, Database.Stateful, Schedulable {
        global Integer swept = 0;

        global Database.QueryLocator start(Database.BatchableContext context) {
            return Database.getQueryLocator([SELECT Id, Status__c FROM Invoice__c WHERE Paid__c = false]);
        }

        global void execute(Database.BatchableContext context, List<Invoice__c> scope) {
            for (Invoice__c row : scope) {
                row.Status__c = 'Overdue';
                swept++;
            }
            update scope;
        }

        global void execute(SchedulableContext context) {
            Database.executeBatch(new InvoiceSweep(), 200);
        }

        global void finish(Database.BatchableContext context) {
            System.debug('Swept ' + swept + ' invoices');
        }
    }
    "#,
    r#"
    public class InvoiceReminderJob implements Queueable {
        private final List<Invoice__c> targets;

        public InvoiceReminderJob(List<Invoice__c> targets) {
            this.targets = targets;
        }

        public void execute(QueueableContext context) {
            for (Invoice__c row : targets) {
                row.Reminder_Sent__c = true;
            }
            update targets;
        }
    }
    "#,
];

#[test]
fn test_render_is_a_fixed_point() {
    for source in SAMPLES {
        let first = generate(&parse(source).expect("sample parses")).unwrap();
        let reparsed = parse(&first)
            .unwrap_or_else(|e| panic!("rendered output failed to parse: {e}\n{first}"));
        let second = generate(&reparsed).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_reparse_yields_the_same_tree() {
    for source in SAMPLES {
        let first = parse(source).unwrap();
        let text = generate(&first).unwrap();
        let second = parse(&text).unwrap();
        assert_eq!(first, second, "tree changed after rendering:\n{text}");
    }
}

#[test]
fn test_fixed_point_with_custom_indent() {
    let options = GenerateOptions { indent_width: 2 };
    for source in SAMPLES {
        let first = generate_with_options(&parse(source).unwrap(), options.clone()).unwrap();
        let second = generate_with_options(&parse(&first).unwrap(), options.clone()).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_prefix_sign_chains_round_trip() {
    for source in ["Integer y = - -x;", "Integer y = + +x;", "Integer y = - --x;", "y = -+-x;"] {
        let first = parse_statement(source).unwrap();
        let text = Generator::new().render_statement(&first).unwrap();
        assert_eq!(parse_statement(&text).unwrap(), first, "{source} rendered as {text}");
    }
}

#[test]
fn test_string_escapes_round_trip() {
    let first = parse_statement(r"String b = 'a\fb\u0041\b';").unwrap();
    let text = Generator::new().render_statement(&first).unwrap();
    assert_eq!(text, r"String b = 'a\fbA\b';");
    assert_eq!(parse_statement(&text).unwrap(), first);
}
